// 该文件是 Pailide （拍立得） 项目的一部分。
// src/geometry.rs - 人脸框与裁剪矩形
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

use serde::{Deserialize, Serialize};

/// 人脸检测框（源图像像素坐标）
///
/// 没有检测结果时使用 `Option::None`，不使用零尺寸的框。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

impl FaceBox {
  pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
    Self { x, y, w, h }
  }

  /// 宽高均为正数时才是有效的人脸
  pub fn is_valid(&self) -> bool {
    self.w > 0.0 && self.h > 0.0
  }

  pub fn center(&self) -> (f64, f64) {
    (self.x + self.w / 2.0, self.y + self.h / 2.0)
  }

  /// 按系数 `alpha` 向 `target` 逐分量插值
  pub fn lerp(&self, target: &FaceBox, alpha: f64) -> FaceBox {
    FaceBox {
      x: lerp(self.x, target.x, alpha),
      y: lerp(self.y, target.y, alpha),
      w: lerp(self.w, target.w, alpha),
      h: lerp(self.h, target.h, alpha),
    }
  }
}

/// 源图像上的裁剪区域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
  pub sx: f64,
  pub sy: f64,
  pub sw: f64,
  pub sh: f64,
}

impl CropRect {
  pub fn aspect(&self) -> f64 {
    self.sw / self.sh
  }

  /// 判断裁剪区域是否完全落在 `width`×`height` 的源图像内
  pub fn fits_within(&self, width: f64, height: f64) -> bool {
    const EPS: f64 = 1e-9;
    self.sx >= -EPS
      && self.sy >= -EPS
      && self.sx + self.sw <= width + EPS
      && self.sy + self.sh <= height + EPS
  }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
  a + (b - a) * t
}

/// 与 `f64::clamp` 不同，`min > max` 时不会 panic，而是以 `min` 为准
pub fn clamp(v: f64, min: f64, max: f64) -> f64 {
  min.max(max.min(v))
}
