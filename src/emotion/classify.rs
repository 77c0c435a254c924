// 该文件是 Pailide （拍立得） 项目的一部分。
// src/emotion/classify.rs - 复合表情分类
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

use crate::emotion::{BaseScores, EmotionLabel, EmotionResult, EmotionScores};

/// 复合表情各组成部分的最小得分（严格大于）
pub const MIN_THRESHOLD: f64 = 0.15;
/// 复合表情覆盖主标签所需的最小得分（严格大于）
pub const COMPOSITE_MIN: f64 = 0.25;

/// 两个组成部分都超过门限时按权重求和，上限 1；否则为 0
fn gated_blend(a: f64, wa: f64, b: f64, wb: f64) -> f64 {
  if a > MIN_THRESHOLD && b > MIN_THRESHOLD {
    (a * wa + b * wb).min(1.0)
  } else {
    0.0
  }
}

/// 由基础得分推导全部 11 项得分
pub fn derive_scores(base: &BaseScores) -> EmotionScores {
  EmotionScores {
    base: *base,
    // 满足：开心 + 平静
    satisfied: gated_blend(base.happy, 0.65, base.neutral, 0.35),
    // 理解：惊讶 + 平静
    understanding: gated_blend(base.surprised, 0.45, base.neutral, 0.55),
    // 好奇：惊讶 + 开心
    intrigued: gated_blend(base.surprised, 0.55, base.happy, 0.45),
    // 困惑：惊讶 + 恐惧
    confused: gated_blend(base.surprised, 0.5, base.fearful, 0.5),
  }
}

/// 基础得分最高的标签，并列时按固定顺序取第一个；全为 0 时为 `Neutral`
pub fn primary_label(base: &BaseScores) -> (EmotionLabel, f64) {
  base
    .iter()
    .fold((EmotionLabel::Neutral, 0.0), |(best, best_value), (label, value)| {
      if value > best_value {
        (label, value)
      } else {
        (best, best_value)
      }
    })
}

/// 对基础得分进行分类
///
/// 复合标签按 `satisfied, understanding, intrigued, confused` 的顺序依次判定，
/// 得分大于 [`COMPOSITE_MIN`] 且严格大于当前最佳值时替换当前结果。
pub fn classify(base: &BaseScores) -> EmotionResult {
  let (mut emotion, mut value) = primary_label(base);
  let all_scores = derive_scores(base);

  for label in EmotionLabel::COMPOSITE {
    let score = all_scores.get(label);
    if score > COMPOSITE_MIN && score > value {
      emotion = label;
      value = score;
    }
  }

  let confidence = (value * 100.0).round().clamp(0.0, 100.0) as u8;
  debug!("表情分类: {} ({}%)", emotion, confidence);

  EmotionResult {
    emotion,
    confidence,
    all_scores,
  }
}
