// 该文件是 Pailide （拍立得） 项目的一部分。
// src/input.rs - 视频/图像输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;

use crate::{FromUrl, frame::RasterBuffer};

/// 可供人脸检测轮询读取的视频源
pub trait VideoSource {
  /// 是否已有解码完成的帧
  fn is_ready(&self) -> bool;

  /// 源图像的原始尺寸，未知时为 `None`
  fn dimensions(&self) -> Option<(u32, u32)>;

  /// 当前帧的拷贝
  fn snapshot(&self) -> Option<RasterBuffer>;
}

impl<S: VideoSource + ?Sized> VideoSource for std::sync::Arc<S> {
  fn is_ready(&self) -> bool {
    (**self).is_ready()
  }

  fn dimensions(&self) -> Option<(u32, u32)> {
    (**self).dimensions()
  }

  fn snapshot(&self) -> Option<RasterBuffer> {
    (**self).snapshot()
  }
}

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

mod score_file;
pub use self::score_file::{ScoreFileExpressions, ScoreFileError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_image_file")]
  #[error("Image file input error: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

pub enum InputWrapper {
  #[cfg(feature = "read_image_file")]
  ReadImageFile(ImageFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "read_image_file")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == ImageFileInput::SCHEME {
        let input = ImageFileInput::from_url(url)?;
        return Ok(InputWrapper::ReadImageFile(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl VideoSource for InputWrapper {
  fn is_ready(&self) -> bool {
    match self {
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(input) => input.is_ready(),
    }
  }

  fn dimensions(&self) -> Option<(u32, u32)> {
    match self {
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(input) => input.dimensions(),
    }
  }

  fn snapshot(&self) -> Option<RasterBuffer> {
    match self {
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(input) => input.snapshot(),
    }
  }
}
