// 该文件是 Pailide （拍立得） 项目的一部分。
// src/task.rs - 拍摄任务
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

use std::{
  fmt::Display,
  sync::{Arc, mpsc},
  thread,
  time::Duration,
};
use tracing::{info, warn};

use crate::{
  beauty::BeautyFilter,
  config::BoothConfig,
  detector::FaceDetector,
  emotion::{EmotionAnalyzer, EmotionOutcome, ExpressionDetector},
  frame::{RasterBuffer, capture_frame, placeholder_frame},
  framing::plan_crop,
  geometry::{CropRect, FaceBox},
  input::VideoSource,
  output::Render,
  poller::FacePoller,
  tracker::FaceTracker,
};

pub trait Task<S, B, O>: Sized {
  type Error;
  fn run_task(self, source: S, booth: B, output: O) -> Result<(), Self::Error>;
}

/// 一次拍摄的结果
#[derive(Debug, Clone)]
pub struct Shot {
  /// 使用的裁剪区域，占位画面时为 `None`
  pub crop: Option<CropRect>,
  pub photo: RasterBuffer,
  pub outcome: EmotionOutcome,
}

/// 拍摄流水线：构图、采集、美颜、表情分析
pub struct PhotoBooth<D, E> {
  config: BoothConfig,
  detector: Arc<D>,
  filter: BeautyFilter,
  analyzer: EmotionAnalyzer<E>,
}

impl<D: FaceDetector, E: ExpressionDetector> PhotoBooth<D, E> {
  pub fn new(config: BoothConfig, detector: Arc<D>, expressions: E) -> Self {
    Self {
      filter: BeautyFilter::new(config.beauty_level),
      analyzer: EmotionAnalyzer::new(expressions).with_preprocess(config.preprocess_expressions),
      detector,
      config,
    }
  }

  pub fn config(&self) -> &BoothConfig {
    &self.config
  }

  pub fn detector(&self) -> Arc<D> {
    self.detector.clone()
  }

  /// 对单帧做一次人脸检测，关闭人脸构图时不检测
  pub fn locate_face(&self, frame: &RasterBuffer) -> Result<Option<FaceBox>, D::Error> {
    if !self.config.face_zoom {
      return Ok(None);
    }
    let mut tracker = FaceTracker::new();
    tracker.observe(self.detector.detect(frame)?);
    Ok(tracker.current())
  }

  /// 拍摄一张照片
  ///
  /// 没有可用的源画面时使用占位画面，不视为错误。
  pub fn shoot(&self, source: Option<&RasterBuffer>, face: Option<FaceBox>) -> Result<Shot, E::Error> {
    let (target_w, target_h) = (self.config.target_width, self.config.target_height);
    let face = face.filter(|_| self.config.face_zoom);

    let (crop, photo) = match source.filter(|frame| frame.width() > 0 && frame.height() > 0) {
      Some(frame) => {
        let crop = plan_crop(
          frame.width() as f64,
          frame.height() as f64,
          target_w as f64,
          target_h as f64,
          face,
        );
        let mut photo = capture_frame(frame, &crop, target_w, target_h, self.config.mirror);
        self.filter.apply(&mut photo);
        (Some(crop), photo)
      }
      None => {
        warn!("没有可用的摄像头画面，使用占位画面");
        (None, placeholder_frame(target_w, target_h))
      }
    };

    let outcome = self.analyzer.analyze(&photo)?;

    Ok(Shot {
      crop,
      photo,
      outcome,
    })
  }
}

fn report(outcome: &EmotionOutcome) {
  match outcome.result() {
    Some(result) => {
      let info = result.emotion.info();
      info!(
        "{} {} ({}%): {}",
        info.icon, info.ja, result.confidence, info.description
      );
    }
    None => info!("照片中没有人脸"),
  }
}

pub struct OneShotTask;

impl<
  S: VideoSource,
  D: FaceDetector<Error = DE>,
  E: ExpressionDetector<Error = EE>,
  DE: std::error::Error + Sync + Send + 'static,
  EE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  O: Render<RasterBuffer, EmotionOutcome, Error = RE>,
> Task<S, PhotoBooth<D, E>, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, source: S, booth: PhotoBooth<D, E>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = source.snapshot();
    let face = match &frame {
      Some(frame) => booth.locate_face(frame)?,
      None => None,
    };
    info!("人脸位置: {:?}", face);

    let now = std::time::Instant::now();
    let shot = booth.shoot(frame.as_ref(), face)?;
    info!("拍摄完成，耗时: {:.2?}", now.elapsed());
    report(&shot.outcome);
    output.render_result(&shot.photo, &shot.outcome)?;
    info!("输出完成，耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 后台轮询人脸位置，按固定间隔连续拍摄
#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<
  S: VideoSource + Send + Sync + 'static,
  D: FaceDetector + Send + Sync + 'static,
  E: ExpressionDetector<Error = EE>,
  EE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  O: Render<RasterBuffer, EmotionOutcome, Error = RE>,
> Task<Arc<S>, PhotoBooth<D, E>, O> for ContinuousTask
where
  D::Error: Display,
{
  type Error = anyhow::Error;

  fn run_task(self, source: Arc<S>, booth: PhotoBooth<D, E>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = mpsc::channel();

    let interrupt = tx.clone();
    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = interrupt.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    }) {
      warn!("无法注册中断处理: {}", e);
    }

    let config = *booth.config();
    let poller = FacePoller::new(booth.detector(), source.clone())
      .with_interval(config.poll_interval)
      .with_tracker(FaceTracker::new().with_enabled(config.face_zoom));
    let handle = poller.start();

    let mut shot_index = 0;
    let result = loop {
      if rx.recv_timeout(config.shot_interval).is_ok() {
        warn!("中断信号接收，退出任务循环");
        break Ok(());
      }

      shot_index += 1;
      info!("拍摄第 {} 张照片", shot_index);
      let now = std::time::Instant::now();
      let shot = match booth.shoot(source.snapshot().as_ref(), handle.current_face()) {
        Ok(shot) => shot,
        Err(e) => break Err(anyhow::Error::from(e)),
      };
      let elapsed_a = now.elapsed();
      report(&shot.outcome);
      if let Err(e) = output.render_result(&shot.photo, &shot.outcome) {
        break Err(anyhow::Error::from(e));
      }
      info!("拍摄完成，耗时: {:.2?} / {:.2?}", elapsed_a, now.elapsed());

      if self.frame_number.map(|n| shot_index >= n).unwrap_or(false) {
        info!("达到指定张数 {}, 退出任务循环", shot_index);
        break Ok(());
      }
    };

    drop(tx);
    handle.stop();
    info!("任务完成，退出");
    result
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Mutex};

  use super::*;
  use crate::{
    beauty::BeautyLevel,
    detector::NoFaceDetector,
    emotion::{BaseScores, EmotionLabel},
  };
  use image::{Rgba, RgbaImage};

  struct FixedFace(FaceBox);

  impl FaceDetector for FixedFace {
    type Error = Infallible;

    fn detect(&self, _: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
      Ok(Some(self.0))
    }
  }

  struct Smiling;

  impl ExpressionDetector for Smiling {
    type Error = Infallible;

    fn detect_expressions(&self, _: &RasterBuffer) -> Result<Option<BaseScores>, Self::Error> {
      Ok(Some(BaseScores {
        happy: 0.9,
        neutral: 0.05,
        ..Default::default()
      }))
    }
  }

  struct Still(Option<RasterBuffer>);

  impl VideoSource for Still {
    fn is_ready(&self) -> bool {
      self.0.is_some()
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
      self.0.as_ref().map(|f| f.dimensions())
    }

    fn snapshot(&self) -> Option<RasterBuffer> {
      self.0.clone()
    }
  }

  #[derive(Default)]
  struct Collect(Mutex<Vec<(u32, u32, EmotionOutcome)>>);

  impl Render<RasterBuffer, EmotionOutcome> for &Collect {
    type Error = std::io::Error;

    fn render_result(&self, frame: &RasterBuffer, result: &EmotionOutcome) -> Result<(), Self::Error> {
      self
        .0
        .lock()
        .unwrap()
        .push((frame.width(), frame.height(), *result));
      Ok(())
    }
  }

  fn config() -> BoothConfig {
    BoothConfig::default().with_target_size(30, 40)
  }

  fn camera() -> RasterBuffer {
    RgbaImage::from_fn(100, 100, |x, _| Rgba([x as u8, 50, 50, 255]))
  }

  #[test]
  fn face_zoom_uses_the_face_crop() {
    let face = FaceBox::new(40.0, 40.0, 10.0, 10.0);
    let booth = PhotoBooth::new(
      config().with_face_zoom(true),
      Arc::new(FixedFace(face)),
      Smiling,
    );
    let frame = camera();
    let located = booth.locate_face(&frame).unwrap();
    assert_eq!(located, Some(face));

    let shot = booth.shoot(Some(&frame), located).unwrap();
    let crop = shot.crop.unwrap();
    assert!(crop.sw < 100.0);
    assert!(crop.fits_within(100.0, 100.0));
    assert!((crop.aspect() - 0.75).abs() < 1e-9);
    assert_eq!(shot.photo.dimensions(), (30, 40));
  }

  #[test]
  fn face_is_ignored_without_face_zoom() {
    let face = FaceBox::new(40.0, 40.0, 10.0, 10.0);
    let booth = PhotoBooth::new(config(), Arc::new(FixedFace(face)), Smiling);
    assert_eq!(booth.locate_face(&camera()).unwrap(), None);

    let shot = booth.shoot(Some(&camera()), Some(face)).unwrap();
    let crop = shot.crop.unwrap();
    assert!((crop.sw - 75.0).abs() < 1e-9);
    assert!((crop.sx - 12.5).abs() < 1e-9);
  }

  #[test]
  fn missing_frame_yields_placeholder() {
    let booth = PhotoBooth::new(config(), Arc::new(NoFaceDetector), Smiling);
    let shot = booth.shoot(None, None).unwrap();
    assert!(shot.crop.is_none());
    assert_eq!(shot.photo.get_pixel(0, 0), &Rgba([0x15, 0x15, 0x15, 0xff]));
  }

  #[test]
  fn placeholder_is_not_beautified() {
    let booth = PhotoBooth::new(
      config().with_beauty_level(BeautyLevel::MAX),
      Arc::new(NoFaceDetector),
      Smiling,
    );
    let shot = booth.shoot(None, None).unwrap();
    assert!(
      shot
        .photo
        .pixels()
        .all(|p| *p == Rgba([0x15, 0x15, 0x15, 0xff]))
    );
  }

  #[test]
  fn beauty_level_changes_the_photo() {
    let plain = PhotoBooth::new(config(), Arc::new(NoFaceDetector), Smiling)
      .shoot(Some(&camera()), None)
      .unwrap();
    let level = BeautyLevel::new(6).unwrap();
    let beautified = PhotoBooth::new(
      config().with_beauty_level(level),
      Arc::new(NoFaceDetector),
      Smiling,
    )
    .shoot(Some(&camera()), None)
    .unwrap();
    assert_ne!(plain.photo, beautified.photo);
  }

  #[test]
  fn one_shot_renders_once() {
    let output = Collect::default();
    let booth = PhotoBooth::new(config(), Arc::new(NoFaceDetector), Smiling);
    OneShotTask
      .run_task(Still(Some(camera())), booth, &output)
      .unwrap();

    let rendered = output.0.lock().unwrap();
    assert_eq!(rendered.len(), 1);
    let (w, h, outcome) = rendered[0];
    assert_eq!((w, h), (30, 40));
    assert_eq!(outcome.result().unwrap().emotion, EmotionLabel::Happy);
  }

  #[test]
  fn continuous_stops_after_frame_number() {
    let output = Collect::default();
    let booth = PhotoBooth::new(
      config()
        .with_face_zoom(true)
        .with_poll_interval(Duration::from_millis(5))
        .with_shot_interval(Duration::from_millis(20)),
      Arc::new(FixedFace(FaceBox::new(40.0, 40.0, 10.0, 10.0))),
      Smiling,
    );
    ContinuousTask::default()
      .with_frame_number(Some(3))
      .run_task(Arc::new(Still(Some(camera()))), booth, &output)
      .unwrap();
    assert_eq!(output.0.lock().unwrap().len(), 3);
  }
}
