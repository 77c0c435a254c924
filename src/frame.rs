// 该文件是 Pailide （拍立得） 项目的一部分。
// src/frame.rs - RGBA 帧定义与拍照采集
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

use image::{Rgba, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::geometry::CropRect;

/// 行优先的 RGBA 8 位像素缓冲，一次拍照期间由采集/滤镜流程独占
pub type RasterBuffer = RgbaImage;

/// 默认输出尺寸
pub const DEFAULT_TARGET_WIDTH: u32 = 600;
pub const DEFAULT_TARGET_HEIGHT: u32 = 800;

const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([0x15, 0x15, 0x15, 0xff]);

/// 将裁剪区域换算为整数像素区域，至少 1x1 且不超出源图像
fn pixel_region(crop: &CropRect, width: u32, height: u32) -> (u32, u32, u32, u32) {
  let x = (crop.sx.round().max(0.0) as u32).min(width.saturating_sub(1));
  let y = (crop.sy.round().max(0.0) as u32).min(height.saturating_sub(1));
  let w = (crop.sw.round() as u32).clamp(1, width - x);
  let h = (crop.sh.round() as u32).clamp(1, height - y);
  (x, y, w, h)
}

/// 从源帧中按裁剪区域截取、缩放到目标尺寸，可选水平镜像
pub fn capture_frame(
  source: &RasterBuffer,
  crop: &CropRect,
  target_w: u32,
  target_h: u32,
  mirror: bool,
) -> RasterBuffer {
  if source.width() == 0 || source.height() == 0 {
    return placeholder_frame(target_w, target_h);
  }

  let (x, y, w, h) = pixel_region(crop, source.width(), source.height());
  debug!("采集区域: ({}, {}, {}x{}) -> {}x{}", x, y, w, h, target_w, target_h);

  let region = image::imageops::crop_imm(source, x, y, w, h).to_image();
  let mut frame = image::imageops::resize(&region, target_w, target_h, FilterType::Triangle);
  if mirror {
    image::imageops::flip_horizontal_in_place(&mut frame);
  }
  frame
}

/// 摄像头不可用时的占位画面
pub fn placeholder_frame(width: u32, height: u32) -> RasterBuffer {
  RgbaImage::from_pixel(width, height, PLACEHOLDER_COLOR)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gradient(width: u32, height: u32) -> RasterBuffer {
    RgbaImage::from_fn(width, height, |x, _| Rgba([(x % 256) as u8, 0, 0, 255]))
  }

  #[test]
  fn capture_has_target_size() {
    let source = gradient(320, 240);
    let crop = CropRect {
      sx: 10.2,
      sy: 5.7,
      sw: 150.0,
      sh: 200.0,
    };
    let frame = capture_frame(&source, &crop, 60, 80, false);
    assert_eq!(frame.dimensions(), (60, 80));
  }

  #[test]
  fn mirror_flips_columns() {
    let source = gradient(100, 100);
    let crop = CropRect {
      sx: 0.0,
      sy: 0.0,
      sw: 100.0,
      sh: 100.0,
    };
    let plain = capture_frame(&source, &crop, 100, 100, false);
    let mirrored = capture_frame(&source, &crop, 100, 100, true);
    assert_eq!(plain.get_pixel(0, 10), mirrored.get_pixel(99, 10));
    assert!(mirrored.get_pixel(0, 0)[0] > mirrored.get_pixel(99, 0)[0]);
  }

  #[test]
  fn out_of_range_crop_is_kept_inside_source() {
    let source = gradient(50, 50);
    let crop = CropRect {
      sx: 49.9,
      sy: 60.0,
      sw: 500.0,
      sh: 500.0,
    };
    assert_eq!(pixel_region(&crop, 50, 50), (49, 49, 1, 1));
    let frame = capture_frame(&source, &crop, 6, 8, false);
    assert_eq!(frame.dimensions(), (6, 8));
  }

  #[test]
  fn placeholder_is_dark_and_opaque() {
    let frame = placeholder_frame(4, 4);
    assert!(frame.pixels().all(|p| *p == PLACEHOLDER_COLOR));
  }
}
