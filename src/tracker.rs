// 该文件是 Pailide （拍立得） 项目的一部分。
// src/tracker.rs - 人脸框平滑跟踪
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

use tracing::{debug, trace};

use crate::geometry::FaceBox;

/// 指数滑动平均的混合系数
pub const SMOOTHING_ALPHA: f64 = 0.35;

/// 人脸跟踪器
///
/// 保存检测器最近一次给出的人脸框（`latest`）以及平滑后的人脸框（`smoothed`）。
/// 检测为空时只清除 `latest`，`smoothed` 保持不变，直到新的检测或显式重置。
#[derive(Debug, Clone)]
pub struct FaceTracker {
  enabled: bool,
  alpha: f64,
  latest: Option<FaceBox>,
  smoothed: Option<FaceBox>,
}

impl Default for FaceTracker {
  fn default() -> Self {
    Self {
      enabled: true,
      alpha: SMOOTHING_ALPHA,
      latest: None,
      smoothed: None,
    }
  }
}

impl FaceTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.set_enabled(enabled);
    self
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// 开关跟踪；关闭时清空全部状态，重新开启后从零开始
  pub fn set_enabled(&mut self, enabled: bool) {
    self.enabled = enabled;
    if !enabled {
      self.reset();
    }
    debug!("人脸跟踪: {}", if enabled { "开启" } else { "关闭" });
  }

  pub fn reset(&mut self) {
    self.latest = None;
    self.smoothed = None;
  }

  /// 接收一次检测结果
  pub fn observe(&mut self, detection: Option<FaceBox>) {
    if !self.enabled {
      // 关闭期间完成的检测请求直接丢弃
      trace!("跟踪已关闭，忽略检测结果");
      return;
    }

    // 宽高不为正的框按未检测到处理
    match detection.filter(FaceBox::is_valid) {
      None => self.latest = None,
      Some(raw) => {
        self.latest = Some(raw);
        self.smooth(raw);
      }
    }
  }

  fn smooth(&mut self, raw: FaceBox) {
    let next = match self.smoothed {
      None => raw,
      Some(prev) => prev.lerp(&raw, self.alpha),
    };
    trace!(
      "平滑人脸框: ({:.1}, {:.1}, {:.1}x{:.1})",
      next.x, next.y, next.w, next.h
    );
    self.smoothed = Some(next);
  }

  pub fn latest(&self) -> Option<FaceBox> {
    self.latest
  }

  pub fn smoothed(&self) -> Option<FaceBox> {
    self.smoothed
  }

  /// 拍照时使用的人脸框：优先平滑值，其次最近一次检测值，且必须有效
  pub fn current(&self) -> Option<FaceBox> {
    if !self.enabled {
      return None;
    }
    self
      .smoothed
      .or(self.latest)
      .filter(FaceBox::is_valid)
  }
}
