// 该文件是 Pailide （拍立得） 项目的一部分。
// src/bin/classify_scores.rs - 对表情得分文件分类
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use pailide::{
  FromUrl,
  emotion::{EmotionOutcome, classify},
  input::ScoreFileExpressions,
};
use tracing::info;

/// 读取基础表情得分，输出分类结果
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 表情得分来源
  #[arg(long, value_name = "EXPRESSIONS")]
  pub expressions: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  info!("表情得分来源: {}", args.expressions);

  let outcome = match ScoreFileExpressions::from_url(&args.expressions)?.read()? {
    Some(scores) => EmotionOutcome::Detected(classify(&scores)),
    None => EmotionOutcome::NoFace,
  };

  if let Some(result) = outcome.result() {
    let info = result.emotion.info();
    info!(
      "{} {} ({}%): {}",
      info.icon, info.ja, result.confidence, info.description
    );
  }
  println!("{}", serde_json::to_string_pretty(&outcome)?);

  Ok(())
}
