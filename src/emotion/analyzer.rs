// 该文件是 Pailide （拍立得） 项目的一部分。
// src/emotion/analyzer.rs - 照片表情分析
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

use serde::Serialize;
use tracing::info;

use crate::{
  emotion::{BaseScores, EmotionResult, classify},
  frame::RasterBuffer,
};

const PREPROCESS_CONTRAST: f32 = 1.1;
const PREPROCESS_BRIGHTNESS: f32 = 10.0;

/// 外部表情识别能力
///
/// 对单张图像中的一张人脸给出基础表情得分，没有人脸时返回 `Ok(None)`。
pub trait ExpressionDetector {
  type Error;

  fn detect_expressions(&self, image: &RasterBuffer) -> Result<Option<BaseScores>, Self::Error>;
}

impl<D: ExpressionDetector + ?Sized> ExpressionDetector for &D {
  type Error = D::Error;

  fn detect_expressions(&self, image: &RasterBuffer) -> Result<Option<BaseScores>, Self::Error> {
    (**self).detect_expressions(image)
  }
}

/// 分析结果；未检测到人脸是正常结果而非错误
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmotionOutcome {
  NoFace,
  Detected(EmotionResult),
}

impl EmotionOutcome {
  pub fn result(&self) -> Option<&EmotionResult> {
    match self {
      EmotionOutcome::NoFace => None,
      EmotionOutcome::Detected(result) => Some(result),
    }
  }
}

/// 识别前的亮度与对比度调整：`c' = 1.1 * (c - 128) + 128 + 10`
pub fn enhance_for_expression(image: &RasterBuffer) -> RasterBuffer {
  let mut enhanced = image.clone();
  for pixel in enhanced.pixels_mut() {
    for c in pixel.0.iter_mut().take(3) {
      let v = PREPROCESS_CONTRAST * (*c as f32 - 128.0) + 128.0 + PREPROCESS_BRIGHTNESS;
      *c = v.round().clamp(0.0, 255.0) as u8;
    }
  }
  enhanced
}

/// 表情分析器，持有注入的表情识别能力
pub struct EmotionAnalyzer<D> {
  detector: D,
  preprocess: bool,
}

impl<D: ExpressionDetector> EmotionAnalyzer<D> {
  pub fn new(detector: D) -> Self {
    Self {
      detector,
      preprocess: true,
    }
  }

  pub fn with_preprocess(mut self, preprocess: bool) -> Self {
    self.preprocess = preprocess;
    self
  }

  pub fn analyze(&self, image: &RasterBuffer) -> Result<EmotionOutcome, D::Error> {
    let now = std::time::Instant::now();
    let scores = if self.preprocess {
      self.detector.detect_expressions(&enhance_for_expression(image))?
    } else {
      self.detector.detect_expressions(image)?
    };

    let outcome = match scores {
      None => {
        info!("未检测到人脸");
        EmotionOutcome::NoFace
      }
      Some(scores) => {
        let result = classify(&scores);
        info!(
          "表情分析完成: {} {} ({}%), 耗时: {:.2?}",
          result.emotion.info().icon,
          result.emotion,
          result.confidence,
          now.elapsed()
        );
        EmotionOutcome::Detected(result)
      }
    };
    Ok(outcome)
  }
}
