// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/engine/seeta.rs - SeetaFace 检测引擎
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::{
  config::{Delegate, DetectorOptions},
  engine::{Detection, EngineError, FaceEngine},
};

const SEETA_MIN_FACE_SIZE: u32 = 20;
const SEETA_PYRAMID_SCALE: f32 = 0.8;
const SEETA_WINDOW_STEP: (u32, u32) = (4, 4);
/// SeetaFace 原始分数与 [0,1] 置信度阈值的换算比例
const SEETA_SCORE_SCALE: f64 = 4.0;

/// 基于 rustface（SeetaFace）的检测引擎
pub struct SeetaEngine {
  model: rustface::Model,
  score_thresh: f64,
}

impl SeetaEngine {
  /// 从配置中的模型文件构建引擎
  pub fn new(options: &DetectorOptions) -> Result<Self, EngineError> {
    if options.delegate == Delegate::Gpu {
      warn!("SeetaFace 引擎不支持 GPU 代理，回退到 CPU");
    }

    info!("加载人脸检测模型: {}", options.model.display());
    let model_data = std::fs::read(&options.model)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let model = rustface::read_model(std::io::Cursor::new(model_data))
      .map_err(|e| EngineError::ModelInvalid(e.to_string()))?;
    info!("模型加载完成");

    Ok(SeetaEngine {
      model,
      score_thresh: options.threshold as f64 * SEETA_SCORE_SCALE,
    })
  }
}

impl FaceEngine for SeetaEngine {
  fn detect(&self, image: &RgbaImage) -> Result<Vec<Detection>, EngineError> {
    let gray = image::imageops::grayscale(image);
    let (width, height) = gray.dimensions();

    // rustface 的检测器在检测时需要可变借用，按调用构建以保持 &self 契约
    let mut detector = rustface::create_detector_with_model(self.model.clone());
    detector.set_min_face_size(SEETA_MIN_FACE_SIZE);
    detector.set_score_thresh(self.score_thresh);
    detector.set_pyramid_scale_factor(SEETA_PYRAMID_SCALE);
    detector.set_slide_window_step(SEETA_WINDOW_STEP.0, SEETA_WINDOW_STEP.1);

    let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
    debug!("检测到 {} 张人脸", faces.len());

    Ok(
      faces
        .iter()
        .map(|face| {
          let bbox = face.bbox();
          Detection {
            score: face.score() as f32,
            bbox: [
              bbox.x() as f32,
              bbox.y() as f32,
              bbox.x() as f32 + bbox.width() as f32,
              bbox.y() as f32 + bbox.height() as f32,
            ],
          }
        })
        .collect(),
    )
  }
}
