// 该文件是 Pailide （拍立得） 项目的一部分。
// src/beauty/smooth.rs - 肤色自适应磨皮
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

use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::{beauty::BeautyLevel, frame::RasterBuffer};

/// 融合系数上限
const MAX_BLEND: f32 = 0.8;

/// 粗略的 RGB 肤色判断
pub fn is_skin(rgb: [u8; 3]) -> bool {
  let [r, g, b] = rgb;
  r > 45 && g > 40 && b > 20 && r > g && r > b && r.abs_diff(g) > 10
}

/// 根据与模糊图的差异计算融合系数，差异越小融合越多
pub fn blend_factor(diff: f32, level: BeautyLevel) -> f32 {
  let threshold = level.smooth_threshold();
  if diff >= threshold {
    return 0.0;
  }
  ((1.0 - diff / threshold) * level.get() as f32 / 5.0).min(MAX_BLEND)
}

fn mix(original: u8, blurred: u8, f: f32) -> u8 {
  (original as f32 * (1.0 - f) + blurred as f32 * f)
    .round()
    .clamp(0.0, 255.0) as u8
}

/// 使用默认肤色判断进行磨皮
pub fn smart_smooth(image: &mut RasterBuffer, level: BeautyLevel) {
  smart_smooth_with(image, level, is_skin)
}

/// 使用指定的肤色判断进行磨皮，非肤色像素保持不变，透明度不变
pub fn smart_smooth_with<S>(image: &mut RasterBuffer, level: BeautyLevel, skin: S)
where
  S: Fn([u8; 3]) -> bool,
{
  if level.is_off() || image.width() == 0 || image.height() == 0 {
    return;
  }

  let blurred = gaussian_blur_f32(image, level.blur_radius());
  let mut touched = 0usize;

  for (pixel, blur) in image.pixels_mut().zip(blurred.pixels()) {
    let [r, g, b, _] = pixel.0;
    if !skin([r, g, b]) {
      continue;
    }

    let [br, bg, bb, _] = blur.0;
    let diff = (r.abs_diff(br) as u32 + g.abs_diff(bg) as u32 + b.abs_diff(bb) as u32) as f32;
    let f = blend_factor(diff, level);
    if f <= 0.0 {
      continue;
    }

    pixel.0[0] = mix(r, br, f);
    pixel.0[1] = mix(g, bg, f);
    pixel.0[2] = mix(b, bb, f);
    touched += 1;
  }

  debug!("磨皮像素数: {}", touched);
}
