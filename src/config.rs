// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/config.rs - 检测与标注配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use image::Rgba;

/// 默认置信度阈值
pub const THRESHOLD_DEFAULT: f32 = 0.5;
/// 默认边框扩展量（密度无关单位）
pub const PADDING_DP_DEFAULT: f32 = 200.0;
/// 默认显示密度缩放系数
pub const DENSITY_DEFAULT: f32 = 1.0;
/// 默认描边宽度（像素）
pub const STROKE_WIDTH_DEFAULT: u32 = 8;
/// 默认描边颜色（红色）
pub const STROKE_COLOR_DEFAULT: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// 计算代理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegate {
  Cpu,
  Gpu,
}

/// 运行模式；目前只有单图模式会被执行，视频与实时流为预留扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningMode {
  SingleImage,
  Video,
  LiveStream,
}

/// 检测器配置；检测器构建之后不可变，修改配置需要重建检测器
#[derive(Debug, Clone)]
pub struct DetectorOptions {
  /// 模型文件路径
  pub model: PathBuf,
  /// 置信度阈值 (0.0 - 1.0)
  pub threshold: f32,
  /// 计算代理
  pub delegate: Delegate,
  /// 运行模式
  pub running_mode: RunningMode,
}

impl DetectorOptions {
  pub fn new(model: impl Into<PathBuf>) -> Self {
    DetectorOptions {
      model: model.into(),
      threshold: THRESHOLD_DEFAULT,
      delegate: Delegate::Cpu,
      running_mode: RunningMode::SingleImage,
    }
  }

  pub fn threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  pub fn delegate(mut self, delegate: Delegate) -> Self {
    self.delegate = delegate;
    self
  }

  pub fn running_mode(mut self, running_mode: RunningMode) -> Self {
    self.running_mode = running_mode;
    self
  }
}

/// 标注配置
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
  /// 边框向四周扩展的距离（密度无关单位）
  pub padding_dp: f32,
  /// 显示密度缩放系数
  pub density: f32,
  /// 描边颜色
  pub stroke_color: Rgba<u8>,
  /// 描边宽度（像素）
  pub stroke_width: u32,
}

impl Default for AnnotateOptions {
  fn default() -> Self {
    AnnotateOptions {
      padding_dp: PADDING_DP_DEFAULT,
      density: DENSITY_DEFAULT,
      stroke_color: STROKE_COLOR_DEFAULT,
      stroke_width: STROKE_WIDTH_DEFAULT,
    }
  }
}

impl AnnotateOptions {
  pub fn padding_dp(mut self, padding_dp: f32) -> Self {
    self.padding_dp = padding_dp;
    self
  }

  pub fn density(mut self, density: f32) -> Self {
    self.density = density;
    self
  }

  pub fn stroke_color(mut self, stroke_color: Rgba<u8>) -> Self {
    self.stroke_color = stroke_color;
    self
  }

  pub fn stroke_width(mut self, stroke_width: u32) -> Self {
    self.stroke_width = stroke_width;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detector_options_defaults() {
    let options = DetectorOptions::new("model.bin");
    assert_eq!(options.threshold, THRESHOLD_DEFAULT);
    assert_eq!(options.delegate, Delegate::Cpu);
    assert_eq!(options.running_mode, RunningMode::SingleImage);
  }

  #[test]
  fn detector_options_setters() {
    let options = DetectorOptions::new("model.bin")
      .threshold(0.7)
      .delegate(Delegate::Gpu)
      .running_mode(RunningMode::Video);
    assert_eq!(options.threshold, 0.7);
    assert_eq!(options.delegate, Delegate::Gpu);
    assert_eq!(options.running_mode, RunningMode::Video);
  }

  #[test]
  fn annotate_options_setters() {
    let options = AnnotateOptions::default()
      .padding_dp(40.0)
      .density(2.0)
      .stroke_color(Rgba([0, 255, 0, 255]))
      .stroke_width(2);
    assert_eq!(options.padding_dp, 40.0);
    assert_eq!(options.density, 2.0);
    assert_eq!(options.stroke_color, Rgba([0, 255, 0, 255]));
    assert_eq!(options.stroke_width, 2);
  }

  #[test]
  fn annotate_options_defaults() {
    let options = AnnotateOptions::default();
    assert_eq!(options.padding_dp, PADDING_DP_DEFAULT);
    assert_eq!(options.density, DENSITY_DEFAULT);
    assert_eq!(options.stroke_color, STROKE_COLOR_DEFAULT);
    assert_eq!(options.stroke_width, STROKE_WIDTH_DEFAULT);
  }
}
