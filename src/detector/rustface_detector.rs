// 该文件是 Pailide （拍立得） 项目的一部分。
// src/detector/rustface_detector.rs - 基于 SeetaFace 的人脸检测
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
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, detector::FaceDetector, frame::RasterBuffer, geometry::FaceBox,
};

#[derive(Error, Debug)]
pub enum RustfaceDetectorError {
  #[error("模型路径必须使用 {0} 方案")]
  SchemeMismatch(String),
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
}

/// 检测参数
#[derive(Debug, Clone, Copy)]
struct DetectParams {
  min_face_size: u32,
  score_thresh: f64,
  pyramid_scale_factor: f32,
  slide_window_step: u32,
}

impl Default for DetectParams {
  fn default() -> Self {
    Self {
      min_face_size: 40,
      score_thresh: 2.0,
      pyramid_scale_factor: 0.8,
      slide_window_step: 4,
    }
  }
}

pub struct RustfaceDetectorBuilder {
  model_path: String,
  params: DetectParams,
}

impl FromUrlWithScheme for RustfaceDetectorBuilder {
  const SCHEME: &'static str = "rustface";
}

impl FromUrl for RustfaceDetectorBuilder {
  type Error = RustfaceDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RustfaceDetectorError::SchemeMismatch(Self::SCHEME.to_string()));
    }

    let mut params = DetectParams::default();
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "min_face" => params.min_face_size = v.parse().unwrap_or(params.min_face_size),
        "score" => params.score_thresh = v.parse().unwrap_or(params.score_thresh),
        _ => {}
      }
    }

    Ok(RustfaceDetectorBuilder {
      model_path: url.path().to_string(),
      params,
    })
  }
}

impl RustfaceDetectorBuilder {
  pub fn build(self) -> Result<RustfaceDetector, RustfaceDetectorError> {
    info!("加载人脸检测模型: {}", self.model_path);
    let data = std::fs::read(&self.model_path)?;
    debug!("模型文件大小: {:.2} MB", data.len() as f64 / (1024.0 * 1024.0));

    let model = rustface::read_model(std::io::Cursor::new(data))
      .map_err(|e| RustfaceDetectorError::ModelInvalid(e.to_string()))?;
    info!("模型加载完成");

    Ok(RustfaceDetector {
      model,
      params: self.params,
    })
  }
}

/// SeetaFace 人脸检测器，取得分最高的一张人脸
pub struct RustfaceDetector {
  model: rustface::Model,
  params: DetectParams,
}

impl FaceDetector for RustfaceDetector {
  type Error = RustfaceDetectorError;

  fn detect(&self, frame: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
    let gray = image::imageops::grayscale(frame);
    let (width, height) = gray.dimensions();

    // rustface 的检测器需要可变借用，每次检测单独创建
    let mut detector = rustface::create_detector_with_model(self.model.clone());
    detector.set_min_face_size(self.params.min_face_size);
    detector.set_score_thresh(self.params.score_thresh);
    detector.set_pyramid_scale_factor(self.params.pyramid_scale_factor);
    detector.set_slide_window_step(self.params.slide_window_step, self.params.slide_window_step);

    let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
    debug!("检测到 {} 张人脸", faces.len());

    let best = faces
      .iter()
      .max_by(|a, b| a.score().total_cmp(&b.score()))
      .map(|face| {
        let bbox = face.bbox();
        FaceBox::new(
          bbox.x() as f64,
          bbox.y() as f64,
          bbox.width() as f64,
          bbox.height() as f64,
        )
      })
      .filter(FaceBox::is_valid);

    Ok(best)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_reads_query_parameters() {
    let url = Url::parse("rustface:///opt/models/seeta.bin?min_face=64&score=1.5").unwrap();
    let builder = RustfaceDetectorBuilder::from_url(&url).unwrap();
    assert_eq!(builder.model_path, "/opt/models/seeta.bin");
    assert_eq!(builder.params.min_face_size, 64);
    assert_eq!(builder.params.score_thresh, 1.5);
  }

  #[test]
  fn builder_rejects_other_schemes() {
    let url = Url::parse("yolo:///opt/models/seeta.bin").unwrap();
    assert!(matches!(
      RustfaceDetectorBuilder::from_url(&url),
      Err(RustfaceDetectorError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn detector_can_be_shared_with_poller_threads() {
    fn shared<T: Send + Sync + 'static>() {}
    shared::<RustfaceDetector>();
  }

  #[test]
  fn missing_model_file_is_an_io_error() {
    let url = Url::parse("rustface:///nonexistent/pailide/seeta.bin").unwrap();
    let result = RustfaceDetectorBuilder::from_url(&url).unwrap().build();
    assert!(matches!(result, Err(RustfaceDetectorError::ModelLoadError(_))));
  }
}
