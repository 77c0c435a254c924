// 该文件是 Pailide （拍立得） 项目的一部分。
// src/detector.rs - 人脸检测能力
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

use std::{convert::Infallible, sync::Arc};

use thiserror::Error;
use url::Url;

use crate::{FromUrl, frame::RasterBuffer, geometry::FaceBox};

/// 外部人脸检测能力，对一帧图像最多给出一个人脸框
pub trait FaceDetector {
  type Error;

  fn detect(&self, frame: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error>;
}

impl<D: FaceDetector + ?Sized> FaceDetector for Arc<D> {
  type Error = D::Error;

  fn detect(&self, frame: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
    (**self).detect(frame)
  }
}

#[cfg(feature = "rustface_detector")]
mod rustface_detector;
#[cfg(feature = "rustface_detector")]
pub use self::rustface_detector::{RustfaceDetector, RustfaceDetectorBuilder, RustfaceDetectorError};

/// 从不报告人脸的检测器，关闭人脸构图时使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
  type Error = Infallible;

  fn detect(&self, _frame: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
    Ok(None)
  }
}

#[derive(Error, Debug)]
pub enum DetectorError {
  #[cfg(feature = "rustface_detector")]
  #[error("rustface 检测器错误: {0}")]
  RustfaceDetectorError(#[from] RustfaceDetectorError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

impl From<Infallible> for DetectorError {
  fn from(e: Infallible) -> Self {
    match e {}
  }
}

pub enum DetectorWrapper {
  None(NoFaceDetector),
  #[cfg(feature = "rustface_detector")]
  Rustface(RustfaceDetector),
}

impl FromUrl for DetectorWrapper {
  type Error = DetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "rustface_detector")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == RustfaceDetectorBuilder::SCHEME {
        let detector = RustfaceDetectorBuilder::from_url(url)?.build()?;
        return Ok(DetectorWrapper::Rustface(detector));
      }
    }
    if url.scheme() == "none" {
      return Ok(DetectorWrapper::None(NoFaceDetector));
    }
    Err(DetectorError::SchemeMismatch)
  }
}

impl DetectorWrapper {
  /// 未指定检测器 URL 时退化为 [`NoFaceDetector`]
  pub fn from_optional_url(url: Option<&Url>) -> Result<Self, DetectorError> {
    match url {
      Some(url) => Self::from_url(url),
      None => Ok(DetectorWrapper::None(NoFaceDetector)),
    }
  }
}

impl FaceDetector for DetectorWrapper {
  type Error = DetectorError;

  fn detect(&self, frame: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
    match self {
      DetectorWrapper::None(detector) => detector.detect(frame).map_err(DetectorError::from),
      #[cfg(feature = "rustface_detector")]
      DetectorWrapper::Rustface(detector) => detector.detect(frame).map_err(DetectorError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbaImage;

  #[test]
  fn missing_url_falls_back_to_no_face() {
    let detector = DetectorWrapper::from_optional_url(None).unwrap();
    assert!(matches!(detector, DetectorWrapper::None(_)));
    assert_eq!(detector.detect(&RgbaImage::new(8, 8)).unwrap(), None);
  }

  #[test]
  fn none_scheme_and_unknown_scheme() {
    let url = Url::parse("none:face").unwrap();
    assert!(matches!(
      DetectorWrapper::from_url(&url),
      Ok(DetectorWrapper::None(_))
    ));
    let url = Url::parse("yolo:///models/face.onnx").unwrap();
    assert!(matches!(
      DetectorWrapper::from_url(&url),
      Err(DetectorError::SchemeMismatch)
    ));
  }

  #[test]
  fn shared_detector_delegates() {
    let detector = Arc::new(NoFaceDetector);
    assert_eq!(detector.detect(&RgbaImage::new(2, 2)).unwrap(), None);
  }
}
