// 该文件是 Pailide （拍立得） 项目的一部分。
// src/config.rs - 拍摄参数
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

use std::time::Duration;

use crate::{
  beauty::BeautyLevel,
  frame::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
  poller::DEFAULT_POLL_INTERVAL,
};

/// 连续拍摄时两张照片之间的间隔
pub const DEFAULT_SHOT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoothConfig {
  pub target_width: u32,
  pub target_height: u32,
  pub beauty_level: BeautyLevel,
  /// 是否根据人脸位置构图
  pub face_zoom: bool,
  /// 成片是否水平镜像
  pub mirror: bool,
  /// 表情识别前是否做亮度与对比度调整
  pub preprocess_expressions: bool,
  pub poll_interval: Duration,
  pub shot_interval: Duration,
}

impl Default for BoothConfig {
  fn default() -> Self {
    Self {
      target_width: DEFAULT_TARGET_WIDTH,
      target_height: DEFAULT_TARGET_HEIGHT,
      beauty_level: BeautyLevel::OFF,
      face_zoom: false,
      mirror: true,
      preprocess_expressions: true,
      poll_interval: DEFAULT_POLL_INTERVAL,
      shot_interval: DEFAULT_SHOT_INTERVAL,
    }
  }
}

impl BoothConfig {
  pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
    self.target_width = width;
    self.target_height = height;
    self
  }

  pub fn with_beauty_level(mut self, level: BeautyLevel) -> Self {
    self.beauty_level = level;
    self
  }

  pub fn with_face_zoom(mut self, face_zoom: bool) -> Self {
    self.face_zoom = face_zoom;
    self
  }

  pub fn with_mirror(mut self, mirror: bool) -> Self {
    self.mirror = mirror;
    self
  }

  pub fn with_preprocess_expressions(mut self, preprocess: bool) -> Self {
    self.preprocess_expressions = preprocess;
    self
  }

  pub fn with_poll_interval(mut self, interval: Duration) -> Self {
    self.poll_interval = interval;
    self
  }

  pub fn with_shot_interval(mut self, interval: Duration) -> Self {
    self.shot_interval = interval;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_kiosk() {
    let config = BoothConfig::default();
    assert_eq!((config.target_width, config.target_height), (600, 800));
    assert!(config.beauty_level.is_off());
    assert!(!config.face_zoom);
    assert!(config.mirror);
    assert_eq!(config.poll_interval, Duration::from_millis(200));
  }

  #[test]
  fn builders_override_fields() {
    let config = BoothConfig::default()
      .with_target_size(300, 400)
      .with_beauty_level(BeautyLevel::MAX)
      .with_face_zoom(true)
      .with_mirror(false)
      .with_poll_interval(Duration::from_millis(50));
    assert_eq!((config.target_width, config.target_height), (300, 400));
    assert_eq!(config.beauty_level, BeautyLevel::MAX);
    assert!(config.face_zoom && !config.mirror);
    assert_eq!(config.poll_interval, Duration::from_millis(50));
  }
}
