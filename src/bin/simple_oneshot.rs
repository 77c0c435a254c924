// 该文件是 Pailide （拍立得） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张拍摄
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

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use url::Url;

use pailide::{
  FromUrl,
  beauty::BeautyLevel,
  config::BoothConfig,
  detector::DetectorWrapper,
  input::{InputWrapper, ScoreFileExpressions},
  output::OutputWrapper,
  task::{OneShotTask, PhotoBooth, Task},
};
use tracing::info;

/// Pailide 单张拍摄参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 人脸检测模型
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Option<Url>,
  /// 表情得分来源
  #[arg(long, value_name = "EXPRESSIONS")]
  pub expressions: Url,
  /// 美颜等级 (0 - 10)
  #[arg(long, default_value = "0", value_name = "LEVEL")]
  pub beauty: BeautyLevel,
  /// 根据人脸位置构图
  #[arg(long)]
  pub face_zoom: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("表情得分来源: {}", args.expressions);

  let config = BoothConfig::default()
    .with_beauty_level(args.beauty)
    .with_face_zoom(args.face_zoom);

  let input = InputWrapper::from_url(&args.input)?;
  let detector = DetectorWrapper::from_optional_url(args.detector.as_ref())?;
  let expressions = ScoreFileExpressions::from_url(&args.expressions)?;
  let output = OutputWrapper::from_url(&args.output)?;

  let booth = PhotoBooth::new(config, Arc::new(detector), expressions);
  OneShotTask.run_task(input, booth, output)?;

  Ok(())
}
