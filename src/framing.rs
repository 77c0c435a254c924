// 该文件是 Pailide （拍立得） 项目的一部分。
// src/framing.rs - 以人脸为中心的构图裁剪
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

use tracing::debug;

use crate::geometry::{CropRect, FaceBox, clamp};

/// 人脸在裁剪区域中所占的比例
pub const DESIRED_FACE_RATIO: f64 = 0.45;
/// 最小裁剪尺寸相对于源图像内最大同比例矩形的比例
pub const MIN_CROP_RATIO: f64 = 0.28;

/// 源图像内能容纳的、宽高比为 `aspect` 的最大矩形
fn largest_fitting(source_w: f64, source_h: f64, aspect: f64) -> (f64, f64) {
  let w = source_w.min(source_h * aspect);
  (w, w / aspect)
}

/// 计算以人脸为中心、符合目标宽高比的裁剪区域
///
/// 调用方负责过滤无效人脸框；宽高非正会直接 panic。
pub fn compute_face_crop(
  source_w: f64,
  source_h: f64,
  target_w: f64,
  target_h: f64,
  face: &FaceBox,
) -> CropRect {
  assert!(
    face.is_valid(),
    "人脸框尺寸必须为正: {}x{}",
    face.w,
    face.h
  );
  assert!(
    source_w > 0.0 && source_h > 0.0 && target_w > 0.0 && target_h > 0.0,
    "图像尺寸必须为正"
  );

  let aspect = target_w / target_h;
  let (cx, cy) = face.center();

  let mut crop_w = face.w / DESIRED_FACE_RATIO;
  let mut crop_h = face.h / DESIRED_FACE_RATIO;

  // 扩大较窄的一边以满足目标宽高比
  if crop_w / crop_h < aspect {
    crop_w = crop_h * aspect;
  } else {
    crop_h = crop_w / aspect;
  }

  // 宽高按同一比例限制在 [28% 最大矩形, 最大矩形] 内，保证宽高比不变
  let (max_w, _) = largest_fitting(source_w, source_h, aspect);
  let min_w = max_w * MIN_CROP_RATIO;
  crop_w = clamp(crop_w, min_w, max_w);
  crop_h = crop_w / aspect;

  let sx = clamp(cx - crop_w / 2.0, 0.0, source_w - crop_w);
  let sy = clamp(cy - crop_h / 2.0, 0.0, source_h - crop_h);

  CropRect {
    sx,
    sy,
    sw: crop_w,
    sh: crop_h,
  }
}

/// 没有人脸时使用的居中裁剪
pub fn center_crop(source_w: f64, source_h: f64, target_w: f64, target_h: f64) -> CropRect {
  let aspect = target_w / target_h;
  let (sw, sh) = largest_fitting(source_w, source_h, aspect);
  CropRect {
    sx: (source_w - sw) / 2.0,
    sy: (source_h - sh) / 2.0,
    sw,
    sh,
  }
}

/// 根据是否有可用人脸选择裁剪方式
pub fn plan_crop(
  source_w: f64,
  source_h: f64,
  target_w: f64,
  target_h: f64,
  face: Option<FaceBox>,
) -> CropRect {
  match face.filter(FaceBox::is_valid) {
    Some(face) => {
      let crop = compute_face_crop(source_w, source_h, target_w, target_h, &face);
      debug!(
        "人脸构图: ({:.1}, {:.1}, {:.1}x{:.1})",
        crop.sx, crop.sy, crop.sw, crop.sh
      );
      crop
    }
    None => {
      debug!("未检测到人脸，使用居中裁剪");
      center_crop(source_w, source_h, target_w, target_h)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f64 = 1e-9;

  fn assert_valid(crop: &CropRect, sw: f64, sh: f64, tw: f64, th: f64) {
    assert!(crop.fits_within(sw, sh), "越界: {:?}", crop);
    assert!((crop.aspect() - tw / th).abs() < 1e-9, "宽高比错误: {:?}", crop);
  }

  #[test]
  fn small_face_is_clamped_to_minimum_zoom() {
    let face = FaceBox::new(100.0, 100.0, 50.0, 50.0);
    let crop = compute_face_crop(1000.0, 1000.0, 600.0, 800.0, &face);
    assert_valid(&crop, 1000.0, 1000.0, 600.0, 800.0);
    // 最大矩形 750x1000，最小为其 28%
    assert!((crop.sw - 210.0).abs() < EPS);
    assert!((crop.sh - 280.0).abs() < EPS);
    assert!((crop.sx - 20.0).abs() < EPS);
    assert!(crop.sy.abs() < EPS);
  }

  #[test]
  fn face_is_centered_when_room_allows() {
    let face = FaceBox::new(900.0, 400.0, 180.0, 180.0);
    let crop = compute_face_crop(1920.0, 1080.0, 600.0, 800.0, &face);
    assert_valid(&crop, 1920.0, 1080.0, 600.0, 800.0);
    // 180 / 0.45 = 400，高度扩展到 533.3
    assert!((crop.sw - 400.0).abs() < EPS);
    assert!((crop.sh - 400.0 / 0.75).abs() < EPS);
    let (cx, cy) = face.center();
    assert!((crop.sx + crop.sw / 2.0 - cx).abs() < EPS);
    assert!((crop.sy + crop.sh / 2.0 - cy).abs() < EPS);
  }

  #[test]
  fn huge_face_is_clamped_to_source() {
    let face = FaceBox::new(0.0, 0.0, 1900.0, 1000.0);
    let crop = compute_face_crop(1920.0, 1080.0, 600.0, 800.0, &face);
    assert_valid(&crop, 1920.0, 1080.0, 600.0, 800.0);
    assert!((crop.sh - 1080.0).abs() < EPS);
    assert!((crop.sw - 810.0).abs() < EPS);
  }

  #[test]
  fn face_near_edges_stays_inside() {
    let sizes = [(640.0, 480.0), (1280.0, 720.0), (480.0, 640.0), (1000.0, 1000.0)];
    let targets = [(600.0, 800.0), (800.0, 600.0), (1.0, 1.0)];
    for &(sw, sh) in &sizes {
      for &(tw, th) in &targets {
        for &(x, y) in &[(0.0, 0.0), (sw - 30.0, sh - 30.0), (sw / 2.0, 0.0)] {
          for &size in &[1.0, 30.0, 200.0, 5000.0] {
            let face = FaceBox::new(x, y, size, size * 1.2);
            let crop = compute_face_crop(sw, sh, tw, th, &face);
            assert_valid(&crop, sw, sh, tw, th);
          }
        }
      }
    }
  }

  #[test]
  #[should_panic]
  fn degenerate_face_panics() {
    compute_face_crop(100.0, 100.0, 3.0, 4.0, &FaceBox::new(0.0, 0.0, 0.0, 10.0));
  }

  #[test]
  fn center_crop_on_landscape_source() {
    let crop = center_crop(1280.0, 720.0, 600.0, 800.0);
    assert!((crop.sh - 720.0).abs() < EPS);
    assert!((crop.sw - 540.0).abs() < EPS);
    assert!((crop.sx - 370.0).abs() < EPS);
    assert!(crop.sy.abs() < EPS);
  }

  #[test]
  fn center_crop_on_portrait_source() {
    let crop = center_crop(600.0, 1000.0, 600.0, 800.0);
    assert!((crop.sw - 600.0).abs() < EPS);
    assert!((crop.sh - 800.0).abs() < EPS);
    assert!(crop.sx.abs() < EPS);
    assert!((crop.sy - 100.0).abs() < EPS);
  }

  #[test]
  fn plan_crop_falls_back_on_invalid_face() {
    let degenerate = Some(FaceBox::new(10.0, 10.0, 0.0, 0.0));
    assert_eq!(
      plan_crop(1280.0, 720.0, 600.0, 800.0, degenerate),
      center_crop(1280.0, 720.0, 600.0, 800.0)
    );
    assert_eq!(
      plan_crop(1280.0, 720.0, 600.0, 800.0, None),
      center_crop(1280.0, 720.0, 600.0, 800.0)
    );
  }
}
