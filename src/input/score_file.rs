// 该文件是 Pailide （拍立得） 项目的一部分。
// src/input/score_file.rs - 表情得分文件输入
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  emotion::{BaseScores, ExpressionDetector},
  frame::RasterBuffer,
};

#[derive(Error, Debug)]
pub enum ScoreFileError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("得分文件格式错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 从 JSON 文件读取外部表情识别的结果
///
/// 文件内容为基础得分对象，例如 `{"happy": 0.8, "neutral": 0.1}`；
/// 内容为 `null` 表示未检测到人脸。每次识别都会重新读取文件。
pub struct ScoreFileExpressions {
  path: PathBuf,
}

impl FromUrlWithScheme for ScoreFileExpressions {
  const SCHEME: &'static str = "scores";
}

impl FromUrl for ScoreFileExpressions {
  type Error = ScoreFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ScoreFileError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }
    Ok(Self {
      path: PathBuf::from(url.path()),
    })
  }
}

impl ScoreFileExpressions {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn read(&self) -> Result<Option<BaseScores>, ScoreFileError> {
    let text = std::fs::read_to_string(&self.path)?;
    let scores: Option<BaseScores> = serde_json::from_str(&text)?;
    debug!("读取表情得分: {:?}", scores);
    Ok(scores)
  }
}

impl ExpressionDetector for ScoreFileExpressions {
  type Error = ScoreFileError;

  fn detect_expressions(&self, _image: &RasterBuffer) -> Result<Option<BaseScores>, Self::Error> {
    self.read()
  }
}
