// 该文件是 Pailide （拍立得） 项目的一部分。
// src/beauty/level.rs - 美颜等级
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

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BeautyLevelError {
  #[error("美颜等级超出范围 [0, 10]: {0}")]
  OutOfRange(i64),
  #[error("无法解析美颜等级: {0}")]
  Parse(String),
}

/// 美颜等级，取值 `[0, 10]`，0 表示不处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BeautyLevel(u8);

impl BeautyLevel {
  pub const OFF: BeautyLevel = BeautyLevel(0);
  pub const MAX: BeautyLevel = BeautyLevel(10);

  pub fn new(level: u8) -> Result<Self, BeautyLevelError> {
    Self::try_from(level as i64)
  }

  pub fn get(&self) -> u8 {
    self.0
  }

  pub fn is_off(&self) -> bool {
    self.0 == 0
  }

  /// 磨皮模糊半径 `2 + level * 1.5`
  pub fn blur_radius(&self) -> f32 {
    2.0 + self.0 as f32 * 1.5
  }

  /// 磨皮差异阈值 `15 + level * 2`
  pub fn smooth_threshold(&self) -> f32 {
    15.0 + self.0 as f32 * 2.0
  }

  /// 美白叠加透明度 `level * 0.06`
  pub fn whitening_alpha(&self) -> f32 {
    self.0 as f32 * 0.06
  }
}

impl TryFrom<i64> for BeautyLevel {
  type Error = BeautyLevelError;

  fn try_from(level: i64) -> Result<Self, Self::Error> {
    if (0..=Self::MAX.0 as i64).contains(&level) {
      Ok(BeautyLevel(level as u8))
    } else {
      Err(BeautyLevelError::OutOfRange(level))
    }
  }
}

impl FromStr for BeautyLevel {
  type Err = BeautyLevelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let level: i64 = s
      .trim()
      .parse()
      .map_err(|_| BeautyLevelError::Parse(s.to_string()))?;
    Self::try_from(level)
  }
}

impl fmt::Display for BeautyLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
