// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/engine.rs - 人脸检测引擎接口
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

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("模型加载错误: {0}")]
  ModelLoad(std::io::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  Inference(String),
}

impl From<std::io::Error> for EngineError {
  fn from(err: std::io::Error) -> Self {
    EngineError::ModelLoad(err)
  }
}

/// 检测到的单张人脸
#[derive(Debug, Clone)]
pub struct Detection {
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
}

/// 人脸检测引擎。
///
/// 引擎的构建由各后端自行提供（构建可能失败），检测是唯一的公共操作，
/// 释放通过 Drop 完成。任何满足该契约的后端都可以直接替换。
pub trait FaceEngine {
  fn detect(&self, image: &RgbaImage) -> Result<Vec<Detection>, EngineError>;
}

#[cfg(feature = "engine_seeta")]
mod seeta;
#[cfg(feature = "engine_seeta")]
pub use self::seeta::SeetaEngine;
