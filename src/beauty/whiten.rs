// 该文件是 Pailide （拍立得） 项目的一部分。
// src/beauty/whiten.rs - 全局美白（柔光叠加）
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

use crate::{beauty::BeautyLevel, frame::RasterBuffer};

/// 暖白叠加色
pub const WHITENING_COLOR: [u8; 3] = [255, 250, 240];

/// W3C 柔光混合，输入输出均为 [0, 1]
pub fn soft_light(backdrop: f32, source: f32) -> f32 {
  if source <= 0.5 {
    backdrop - (1.0 - 2.0 * source) * backdrop * (1.0 - backdrop)
  } else {
    let d = if backdrop <= 0.25 {
      ((16.0 * backdrop - 12.0) * backdrop + 4.0) * backdrop
    } else {
      backdrop.sqrt()
    };
    backdrop + (2.0 * source - 1.0) * (d - backdrop)
  }
}

/// 以 `alpha` 透明度把纯色柔光叠加到一个像素上（source-over 合成）
fn composite(pixel: [u8; 4], color: [f32; 3], alpha: f32) -> [u8; 4] {
  let ab = pixel[3] as f32 / 255.0;
  let ao = alpha + ab * (1.0 - alpha);
  if ao <= 0.0 {
    return pixel;
  }

  let mut out = [0u8; 4];
  for c in 0..3 {
    let cb = pixel[c] as f32 / 255.0;
    let cs = color[c];
    let mixed = (1.0 - ab) * cs + ab * soft_light(cb, cs);
    let co = (alpha * mixed + (1.0 - alpha) * ab * cb) / ao;
    out[c] = (co * 255.0).round().clamp(0.0, 255.0) as u8;
  }
  out[3] = (ao * 255.0).round().clamp(0.0, 255.0) as u8;
  out
}

/// 对整幅图像做美白，不区分肤色
pub fn whiten(image: &mut RasterBuffer, level: BeautyLevel) {
  if level.is_off() {
    return;
  }

  let alpha = level.whitening_alpha();
  let color = WHITENING_COLOR.map(|c| c as f32 / 255.0);
  for pixel in image.pixels_mut() {
    pixel.0 = composite(pixel.0, color, alpha);
  }
}
