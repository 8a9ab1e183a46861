// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use lianpu::{
  FromUrl,
  config::{AnnotateOptions, Delegate, DetectorOptions},
  detector::FaceDetector,
  input::ImageFileInput,
  output::{DirectoryRecordOutput, Render, SaveImageFileOutput},
};

/// Lianpu 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// SeetaFace 模型文件路径
  #[arg(long, value_name = "FILE")]
  pub model: std::path::PathBuf,

  /// 输入图片，例如 image:///path/to/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出位置
  /// 支持格式:
  /// - 单个图像文件: image:///path/to/out.png
  /// - 目录记录: folder:///path/to/records?always
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 边框向四周扩展的距离（密度无关单位）
  #[arg(long, default_value = "200", value_name = "DP")]
  pub padding: f32,

  /// 显示密度缩放系数
  #[arg(long, default_value = "1.0", value_name = "SCALE")]
  pub density: f32,

  /// 计算代理 (cpu 或 gpu)
  #[arg(long, default_value = "cpu", value_name = "DELEGATE")]
  pub delegate: String,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model.display());
  info!("输入来源: {}", args.input);
  info!("输出位置: {}", args.output);
  info!("置信度阈值: {}", args.confidence);

  let delegate = match args.delegate.as_str() {
    "cpu" => Delegate::Cpu,
    "gpu" => Delegate::Gpu,
    other => {
      warn!("未知的计算代理 '{}', 使用 CPU", other);
      Delegate::Cpu
    }
  };

  let options = DetectorOptions::new(&args.model)
    .threshold(args.confidence)
    .delegate(delegate);
  let annotate = AnnotateOptions::default()
    .padding_dp(args.padding)
    .density(args.density);

  let mut detector = FaceDetector::new(options, annotate);
  let input = ImageFileInput::from_url(&args.input)?;

  for image in input {
    match detector.detect_image(&image)? {
      Some(bundle) => {
        info!(
          "检测到 {} 张人脸，耗时: {:.2?}",
          bundle.detections.len(),
          bundle.inference_time
        );
        for face in bundle.detections.iter() {
          info!(
            "  - 分数 {:.2} at ({:.0}, {:.0})-({:.0}, {:.0})",
            face.score, face.bbox[0], face.bbox[1], face.bbox[2], face.bbox[3]
          );
        }

        match args.output.scheme() {
          "folder" => {
            let output = DirectoryRecordOutput::from_url(&args.output)?;
            output.render_result(&image, &bundle)?;
          }
          _ => {
            let output = SaveImageFileOutput::from_url(&args.output)?;
            output.render_result(&image, &bundle)?;
          }
        }
      }
      None => warn!("没有检测结果"),
    }
  }

  detector.release();

  Ok(())
}
