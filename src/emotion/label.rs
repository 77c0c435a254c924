// 该文件是 Pailide （拍立得） 项目的一部分。
// src/emotion/label.rs - 表情标签与得分
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

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EmotionLabelError {
  #[error("未知的表情标签: {0}")]
  Unknown(String),
}

/// 表情标签：7 个基础标签与 4 个复合标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
  Happy,
  Sad,
  Angry,
  Surprised,
  Fearful,
  Disgusted,
  Neutral,
  Satisfied,
  Understanding,
  Intrigued,
  Confused,
}

/// 标签的展示信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionInfo {
  /// 日文名称
  pub ja: &'static str,
  pub icon: &'static str,
  /// 十六进制颜色
  pub color: &'static str,
  pub description: &'static str,
}

impl EmotionLabel {
  /// 基础标签，顺序即并列时的优先顺序
  pub const BASE: [EmotionLabel; 7] = [
    EmotionLabel::Happy,
    EmotionLabel::Sad,
    EmotionLabel::Angry,
    EmotionLabel::Surprised,
    EmotionLabel::Fearful,
    EmotionLabel::Disgusted,
    EmotionLabel::Neutral,
  ];

  /// 复合标签，顺序即覆盖判定顺序
  pub const COMPOSITE: [EmotionLabel; 4] = [
    EmotionLabel::Satisfied,
    EmotionLabel::Understanding,
    EmotionLabel::Intrigued,
    EmotionLabel::Confused,
  ];

  pub const ALL: [EmotionLabel; 11] = [
    EmotionLabel::Happy,
    EmotionLabel::Sad,
    EmotionLabel::Angry,
    EmotionLabel::Surprised,
    EmotionLabel::Fearful,
    EmotionLabel::Disgusted,
    EmotionLabel::Neutral,
    EmotionLabel::Satisfied,
    EmotionLabel::Understanding,
    EmotionLabel::Intrigued,
    EmotionLabel::Confused,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      EmotionLabel::Happy => "happy",
      EmotionLabel::Sad => "sad",
      EmotionLabel::Angry => "angry",
      EmotionLabel::Surprised => "surprised",
      EmotionLabel::Fearful => "fearful",
      EmotionLabel::Disgusted => "disgusted",
      EmotionLabel::Neutral => "neutral",
      EmotionLabel::Satisfied => "satisfied",
      EmotionLabel::Understanding => "understanding",
      EmotionLabel::Intrigued => "intrigued",
      EmotionLabel::Confused => "confused",
    }
  }

  pub fn info(&self) -> EmotionInfo {
    let (ja, icon, color, description) = match self {
      EmotionLabel::Happy => ("笑顔", "😊", "#FFD93D", "相手は嬉しそうです"),
      EmotionLabel::Sad => ("悲しみ", "😢", "#6BCB77", "相手は悲しそうです"),
      EmotionLabel::Angry => ("怒り", "😠", "#FF6B6B", "相手は怒っているようです"),
      EmotionLabel::Surprised => ("驚き", "😲", "#4D96FF", "相手は驚いています"),
      EmotionLabel::Fearful => ("恐れ", "😨", "#9B59B6", "相手は不安そうです"),
      EmotionLabel::Disgusted => ("嫌悪", "🤢", "#1ABC9C", "相手は不快そうです"),
      EmotionLabel::Neutral => ("普通", "😐", "#95A5A6", "相手は落ち着いています"),
      EmotionLabel::Satisfied => ("満足", "😌", "#F39C12", "相手は満足しています"),
      EmotionLabel::Understanding => ("なるほど", "🤔", "#3498DB", "相手は理解・納得しています"),
      EmotionLabel::Intrigued => ("面白そう", "🤨", "#E74C3C", "相手は興味を持っています"),
      EmotionLabel::Confused => ("戸惑い", "😕", "#FFA07A", "相手は戸惑っています"),
    };
    EmotionInfo {
      ja,
      icon,
      color,
      description,
    }
  }
}

impl fmt::Display for EmotionLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EmotionLabel {
  type Err = EmotionLabelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let name = s.trim().to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|label| label.as_str() == name)
      .ok_or_else(|| EmotionLabelError::Unknown(s.to_string()))
  }
}

/// 上游表情识别给出的基础得分，缺失项按 0 处理
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseScores {
  pub happy: f64,
  pub sad: f64,
  pub angry: f64,
  pub surprised: f64,
  pub fearful: f64,
  pub disgusted: f64,
  pub neutral: f64,
}

impl BaseScores {
  /// 复合标签返回 `None`
  pub fn get(&self, label: EmotionLabel) -> Option<f64> {
    match label {
      EmotionLabel::Happy => Some(self.happy),
      EmotionLabel::Sad => Some(self.sad),
      EmotionLabel::Angry => Some(self.angry),
      EmotionLabel::Surprised => Some(self.surprised),
      EmotionLabel::Fearful => Some(self.fearful),
      EmotionLabel::Disgusted => Some(self.disgusted),
      EmotionLabel::Neutral => Some(self.neutral),
      _ => None,
    }
  }

  /// 按基础标签的固定顺序遍历
  pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
    EmotionLabel::BASE
      .into_iter()
      .filter_map(move |label| self.get(label).map(|score| (label, score)))
  }
}

/// 全部 11 个标签的得分，复合得分未通过门限时为 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionScores {
  #[serde(flatten)]
  pub base: BaseScores,
  pub satisfied: f64,
  pub understanding: f64,
  pub intrigued: f64,
  pub confused: f64,
}

impl EmotionScores {
  pub fn get(&self, label: EmotionLabel) -> f64 {
    match label {
      EmotionLabel::Satisfied => self.satisfied,
      EmotionLabel::Understanding => self.understanding,
      EmotionLabel::Intrigued => self.intrigued,
      EmotionLabel::Confused => self.confused,
      base => self.base.get(base).unwrap_or_default(),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
    EmotionLabel::ALL
      .into_iter()
      .map(move |label| (label, self.get(label)))
  }
}

/// 一次分类的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
  pub emotion: EmotionLabel,
  /// 置信度百分比 0..=100
  pub confidence: u8,
  #[serde(rename = "allScores")]
  pub all_scores: EmotionScores,
}
