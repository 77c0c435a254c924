// 该文件是 Pailide （拍立得） 项目的一部分。
// src/poller.rs - 人脸检测轮询
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
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
    mpsc,
  },
  thread::{self, JoinHandle},
  time::Duration,
};

use tracing::{info, trace, warn};

use crate::{detector::FaceDetector, geometry::FaceBox, input::VideoSource, tracker::FaceTracker};

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 跳过本次轮询的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// 跟踪未开启
  Disabled,
  /// 上一次检测尚未完成
  Busy,
  /// 视频源还没有可用的帧
  NotReady,
  /// 视频源尺寸未知
  UnknownDimensions,
}

#[derive(Debug)]
pub enum TickOutcome {
  /// 已发起检测，句柄对应执行检测的工作线程
  Dispatched(JoinHandle<()>),
  Skipped(SkipReason),
}

/// 工作线程结束时（包括 panic）释放忙碌标记
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

/// 人脸检测轮询器
///
/// 同一时间最多只有一个检测请求；忙碌时到来的轮询直接丢弃，不排队。
/// 检测失败只记录日志，不会影响已有的平滑结果。
pub struct FacePoller<D, S> {
  detector: Arc<D>,
  source: Arc<S>,
  tracker: Arc<Mutex<FaceTracker>>,
  busy: Arc<AtomicBool>,
  interval: Duration,
}

impl<D, S> Clone for FacePoller<D, S> {
  fn clone(&self) -> Self {
    Self {
      detector: self.detector.clone(),
      source: self.source.clone(),
      tracker: self.tracker.clone(),
      busy: self.busy.clone(),
      interval: self.interval,
    }
  }
}

fn lock(tracker: &Mutex<FaceTracker>) -> MutexGuard<'_, FaceTracker> {
  tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D, S> FacePoller<D, S>
where
  D: FaceDetector + Send + Sync + 'static,
  D::Error: Display,
  S: VideoSource + Send + Sync + 'static,
{
  pub fn new(detector: Arc<D>, source: Arc<S>) -> Self {
    Self {
      detector,
      source,
      tracker: Arc::new(Mutex::new(FaceTracker::new())),
      busy: Arc::new(AtomicBool::new(false)),
      interval: DEFAULT_POLL_INTERVAL,
    }
  }

  pub fn with_interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  pub fn with_tracker(mut self, tracker: FaceTracker) -> Self {
    self.tracker = Arc::new(Mutex::new(tracker));
    self
  }

  pub fn interval(&self) -> Duration {
    self.interval
  }

  pub fn is_busy(&self) -> bool {
    self.busy.load(Ordering::Acquire)
  }

  pub fn set_enabled(&self, enabled: bool) {
    lock(&self.tracker).set_enabled(enabled);
  }

  /// 拍照时使用的人脸框
  pub fn current_face(&self) -> Option<FaceBox> {
    lock(&self.tracker).current()
  }

  pub fn tracker(&self) -> Arc<Mutex<FaceTracker>> {
    self.tracker.clone()
  }

  /// 执行一次轮询
  pub fn tick(&self) -> TickOutcome {
    if !lock(&self.tracker).is_enabled() {
      return TickOutcome::Skipped(SkipReason::Disabled);
    }
    if self.is_busy() {
      trace!("上一次检测未完成，跳过");
      return TickOutcome::Skipped(SkipReason::Busy);
    }
    if !self.source.is_ready() {
      return TickOutcome::Skipped(SkipReason::NotReady);
    }
    match self.source.dimensions() {
      Some((w, h)) if w > 0 && h > 0 => {}
      _ => return TickOutcome::Skipped(SkipReason::UnknownDimensions),
    }
    let Some(frame) = self.source.snapshot() else {
      return TickOutcome::Skipped(SkipReason::NotReady);
    };

    if self
      .busy
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return TickOutcome::Skipped(SkipReason::Busy);
    }
    let guard = BusyGuard(self.busy.clone());

    let detector = self.detector.clone();
    let tracker = self.tracker.clone();
    let handle = thread::spawn(move || {
      let _guard = guard;
      match detector.detect(&frame) {
        Ok(face) => lock(&tracker).observe(face),
        Err(e) => warn!("人脸检测失败: {}", e),
      }
    });

    TickOutcome::Dispatched(handle)
  }

  /// 在后台线程中按固定间隔轮询
  pub fn start(self) -> PollerHandle {
    let (tx, rx) = mpsc::channel::<()>();
    let tracker = self.tracker.clone();
    info!("启动人脸检测轮询，间隔: {:?}", self.interval);

    let handle = thread::spawn(move || {
      loop {
        if let TickOutcome::Skipped(reason) = self.tick() {
          trace!("跳过轮询: {:?}", reason);
        }
        match rx.recv_timeout(self.interval) {
          Err(mpsc::RecvTimeoutError::Timeout) => continue,
          _ => break,
        }
      }
      info!("人脸检测轮询已停止");
    });

    PollerHandle {
      stop: tx,
      handle,
      tracker,
    }
  }
}

/// 后台轮询句柄
pub struct PollerHandle {
  stop: mpsc::Sender<()>,
  handle: JoinHandle<()>,
  tracker: Arc<Mutex<FaceTracker>>,
}

impl PollerHandle {
  pub fn current_face(&self) -> Option<FaceBox> {
    lock(&self.tracker).current()
  }

  pub fn set_enabled(&self, enabled: bool) {
    lock(&self.tracker).set_enabled(enabled);
  }

  pub fn stop(self) {
    let _ = self.stop.send(());
    if self.handle.join().is_err() {
      warn!("轮询线程异常退出");
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;

  use super::*;
  use crate::frame::RasterBuffer;
  use image::RgbaImage;

  struct Camera {
    ready: AtomicBool,
    size: Option<(u32, u32)>,
  }

  impl Camera {
    fn ready() -> Self {
      Self {
        ready: AtomicBool::new(true),
        size: Some((64, 48)),
      }
    }
  }

  impl VideoSource for Camera {
    fn is_ready(&self) -> bool {
      self.ready.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
      self.size
    }

    fn snapshot(&self) -> Option<RasterBuffer> {
      self.size.map(|(w, h)| RgbaImage::new(w, h))
    }
  }

  /// 按顺序返回预设结果，`gate` 为真之前阻塞
  struct Scripted {
    results: Mutex<Vec<Result<Option<FaceBox>, String>>>,
    gate: Arc<AtomicBool>,
    calls: AtomicUsize,
  }

  impl Scripted {
    fn new(mut results: Vec<Result<Option<FaceBox>, String>>) -> Self {
      results.reverse();
      Self {
        results: Mutex::new(results),
        gate: Arc::new(AtomicBool::new(true)),
        calls: AtomicUsize::new(0),
      }
    }
  }

  impl FaceDetector for Scripted {
    type Error = String;

    fn detect(&self, _: &RasterBuffer) -> Result<Option<FaceBox>, Self::Error> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      while !self.gate.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(1));
      }
      self.results.lock().unwrap().pop().unwrap_or(Ok(None))
    }
  }

  fn run(poller: &FacePoller<Scripted, Camera>) {
    match poller.tick() {
      TickOutcome::Dispatched(handle) => handle.join().unwrap(),
      TickOutcome::Skipped(reason) => panic!("不应跳过: {:?}", reason),
    }
  }

  #[test]
  fn detections_flow_into_tracker() {
    let first = FaceBox::new(0.0, 0.0, 100.0, 100.0);
    let second = FaceBox::new(100.0, 0.0, 100.0, 100.0);
    let poller = FacePoller::new(
      Arc::new(Scripted::new(vec![Ok(Some(first)), Ok(Some(second))])),
      Arc::new(Camera::ready()),
    );

    run(&poller);
    assert_eq!(poller.current_face(), Some(first));
    run(&poller);
    assert!((poller.current_face().unwrap().x - 35.0).abs() < 1e-9);
  }

  #[test]
  fn errors_do_not_clear_smoothed_state() {
    let face = FaceBox::new(10.0, 10.0, 50.0, 50.0);
    let poller = FacePoller::new(
      Arc::new(Scripted::new(vec![Ok(Some(face)), Err("超时".to_string()), Ok(None)])),
      Arc::new(Camera::ready()),
    );

    run(&poller);
    run(&poller);
    assert_eq!(poller.current_face(), Some(face));
    run(&poller);
    let tracker = poller.tracker();
    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.latest(), None);
    assert_eq!(tracker.smoothed(), Some(face));
    assert!(!poller.is_busy());
  }

  #[test]
  fn busy_ticks_are_dropped_not_queued() {
    let detector = Arc::new(Scripted::new(vec![Ok(Some(FaceBox::new(
      1.0, 1.0, 10.0, 10.0,
    )))]));
    detector.gate.store(false, Ordering::SeqCst);
    let poller = FacePoller::new(detector.clone(), Arc::new(Camera::ready()));

    let TickOutcome::Dispatched(handle) = poller.tick() else {
      panic!("第一次轮询应当发起检测");
    };
    for _ in 0..5 {
      assert!(matches!(
        poller.tick(),
        TickOutcome::Skipped(SkipReason::Busy)
      ));
    }

    detector.gate.store(true, Ordering::SeqCst);
    handle.join().unwrap();
    assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    assert!(!poller.is_busy());
    assert!(matches!(poller.tick(), TickOutcome::Dispatched(_)));
  }

  #[test]
  fn unready_source_is_skipped() {
    let camera = Camera::ready();
    camera.ready.store(false, Ordering::SeqCst);
    let poller = FacePoller::new(Arc::new(Scripted::new(vec![])), Arc::new(camera));
    assert!(matches!(
      poller.tick(),
      TickOutcome::Skipped(SkipReason::NotReady)
    ));

    let camera = Camera {
      ready: AtomicBool::new(true),
      size: None,
    };
    let poller = FacePoller::new(Arc::new(Scripted::new(vec![])), Arc::new(camera));
    assert!(matches!(
      poller.tick(),
      TickOutcome::Skipped(SkipReason::UnknownDimensions)
    ));
  }

  #[test]
  fn disabled_tracking_skips_and_resets() {
    let poller = FacePoller::new(
      Arc::new(Scripted::new(vec![Ok(Some(FaceBox::new(0.0, 0.0, 5.0, 5.0)))])),
      Arc::new(Camera::ready()),
    );
    run(&poller);
    assert!(poller.current_face().is_some());

    poller.set_enabled(false);
    assert_eq!(poller.current_face(), None);
    assert!(matches!(
      poller.tick(),
      TickOutcome::Skipped(SkipReason::Disabled)
    ));
  }

  #[test]
  fn background_loop_can_be_stopped() {
    let face = FaceBox::new(3.0, 4.0, 20.0, 20.0);
    let poller = FacePoller::new(
      Arc::new(Scripted::new(vec![Ok(Some(face))])),
      Arc::new(Camera::ready()),
    )
    .with_interval(Duration::from_millis(5));

    let handle = poller.start();
    for _ in 0..200 {
      if handle.current_face().is_some() {
        break;
      }
      thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(handle.current_face(), Some(face));
    handle.stop();
  }
}
