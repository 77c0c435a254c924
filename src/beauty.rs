// 该文件是 Pailide （拍立得） 项目的一部分。
// src/beauty.rs - 美颜滤镜
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

mod level;
mod smooth;
mod whiten;

use tracing::info;

use crate::frame::RasterBuffer;

pub use self::level::{BeautyLevel, BeautyLevelError};
pub use self::smooth::{blend_factor, is_skin, smart_smooth, smart_smooth_with};
pub use self::whiten::{WHITENING_COLOR, soft_light, whiten};

/// 美颜滤镜：先做肤色自适应磨皮，再做全局美白
///
/// 不保存任何状态，每次调用只取决于输入图像和等级。
#[derive(Debug, Clone, Copy, Default)]
pub struct BeautyFilter {
  level: BeautyLevel,
}

impl BeautyFilter {
  pub fn new(level: BeautyLevel) -> Self {
    Self { level }
  }

  pub fn level(&self) -> BeautyLevel {
    self.level
  }

  pub fn apply(&self, image: &mut RasterBuffer) {
    if self.level.is_off() {
      return;
    }
    let now = std::time::Instant::now();
    smart_smooth(image, self.level);
    whiten(image, self.level);
    info!(
      "美颜完成 (等级 {}), 耗时: {:.2?}",
      self.level,
      now.elapsed()
    );
  }
}
