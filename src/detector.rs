// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/detector.rs - 人脸检测器生命周期管理
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::borrow::Cow;
use std::time::{Duration, Instant};

use image::{DynamicImage, GenericImageView, RgbaImage};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::annotate::Annotator;
use crate::config::{AnnotateOptions, DetectorOptions, RunningMode};
use crate::engine::{Detection, FaceEngine};

/// 引擎状态：要么完全可用，要么缺失，没有半初始化的中间态
enum EngineState {
  Ready(Box<dyn FaceEngine>),
  Unavailable,
}

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("运行模式不匹配: 期望 {expected:?}, 实际 {actual:?}")]
  InvalidRunningMode {
    expected: RunningMode,
    actual: RunningMode,
  },
}

/// 单次检测的完整结果；构建后交给调用方，不再修改
pub struct ResultBundle {
  /// 原始检测结果
  pub detections: Box<[Detection]>,
  /// 推理耗时
  pub inference_time: Duration,
  /// 输入图像宽度
  pub input_width: u32,
  /// 输入图像高度
  pub input_height: u32,
  /// 标注后的图像
  pub annotated: RgbaImage,
}

/// 人脸检测器；独占持有引擎，负责其构建与释放
pub struct FaceDetector {
  engine: EngineState,
  options: DetectorOptions,
  annotator: Annotator,
}

impl FaceDetector {
  /// 使用内置的 SeetaFace 引擎构建检测器。
  /// 构建失败只记录日志并使检测器保持不可用状态，不向调用方抛出，
  /// 调用方继续以降级状态运行。
  #[cfg(feature = "engine_seeta")]
  pub fn new(options: DetectorOptions, annotate: AnnotateOptions) -> Self {
    let engine = match crate::engine::SeetaEngine::new(&options) {
      Ok(engine) => EngineState::Ready(Box::new(engine)),
      Err(e) => {
        error!("人脸检测引擎构建失败: {}", e);
        EngineState::Unavailable
      }
    };

    FaceDetector {
      engine,
      options,
      annotator: Annotator::new(annotate),
    }
  }

  /// 注入任意引擎实现
  pub fn with_engine(
    engine: Box<dyn FaceEngine>,
    options: DetectorOptions,
    annotate: AnnotateOptions,
  ) -> Self {
    FaceDetector {
      engine: EngineState::Ready(engine),
      options,
      annotator: Annotator::new(annotate),
    }
  }

  /// 对单张图像执行检测。
  ///
  /// 运行模式必须是 SingleImage，否则返回使用错误；引擎缺失或推理失败
  /// 返回 Ok(None)（构建失败在初始化时已经报告过）。
  pub fn detect_image(&self, image: &DynamicImage) -> Result<Option<ResultBundle>, DetectorError> {
    if self.options.running_mode != RunningMode::SingleImage {
      return Err(DetectorError::InvalidRunningMode {
        expected: RunningMode::SingleImage,
        actual: self.options.running_mode,
      });
    }

    let EngineState::Ready(engine) = &self.engine else {
      debug!("检测引擎不可用，跳过检测");
      return Ok(None);
    };

    // 归一化为 RGBA8；必要时复制，绝不改动调用方的图像
    let frame: Cow<RgbaImage> = match image {
      DynamicImage::ImageRgba8(buf) => Cow::Borrowed(buf),
      _ => Cow::Owned(image.to_rgba8()),
    };

    let now = Instant::now();
    let detections = match engine.detect(&frame) {
      Ok(detections) => detections,
      Err(e) => {
        error!("推理失败: {}", e);
        return Ok(None);
      }
    };
    let inference_time = now.elapsed();
    debug!(
      "检测到 {} 张人脸，耗时: {:.2?}",
      detections.len(),
      inference_time
    );

    let annotated = self.annotator.annotate(image, &detections);

    Ok(Some(ResultBundle {
      detections: detections.into_boxed_slice(),
      inference_time,
      input_width: image.width(),
      input_height: image.height(),
      annotated,
    }))
  }

  /// 释放检测引擎；可重复调用，释放后检测调用返回无结果
  pub fn release(&mut self) {
    if !self.is_released() {
      info!("释放人脸检测引擎");
    }
    self.engine = EngineState::Unavailable;
  }

  /// 引擎是否已缺失（从未构建成功，或已释放）
  pub fn is_released(&self) -> bool {
    matches!(self.engine, EngineState::Unavailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::EngineError;

  struct StubEngine {
    faces: Vec<Detection>,
  }

  impl FaceEngine for StubEngine {
    fn detect(&self, _image: &RgbaImage) -> Result<Vec<Detection>, EngineError> {
      Ok(self.faces.clone())
    }
  }

  struct FailingEngine;

  impl FaceEngine for FailingEngine {
    fn detect(&self, _image: &RgbaImage) -> Result<Vec<Detection>, EngineError> {
      Err(EngineError::Inference("模拟推理失败".to_string()))
    }
  }

  fn test_image() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
      64,
      48,
      image::Rgba([255, 255, 255, 255]),
    ))
  }

  fn stub_detector(faces: Vec<Detection>) -> FaceDetector {
    FaceDetector::with_engine(
      Box::new(StubEngine { faces }),
      DetectorOptions::new("unused.bin"),
      AnnotateOptions::default().padding_dp(4.0),
    )
  }

  #[test]
  fn detect_returns_bundle_with_input_dimensions() {
    let detector = stub_detector(vec![Detection {
      score: 0.8,
      bbox: [8.0, 8.0, 24.0, 24.0],
    }]);
    let bundle = detector
      .detect_image(&test_image())
      .unwrap()
      .expect("应当返回结果");
    assert_eq!(bundle.input_width, 64);
    assert_eq!(bundle.input_height, 48);
    assert_eq!(bundle.detections.len(), 1);
    assert_eq!(bundle.annotated.dimensions(), (64, 48));
  }

  #[test]
  fn empty_detection_set_still_returns_bundle() {
    let detector = stub_detector(vec![]);
    let bundle = detector
      .detect_image(&test_image())
      .unwrap()
      .expect("空检测集也应返回结果");
    assert!(bundle.detections.is_empty());
    assert_eq!(bundle.annotated, test_image().to_rgba8());
  }

  #[test]
  fn wrong_running_mode_fails_loudly() {
    let detector = FaceDetector::with_engine(
      Box::new(StubEngine { faces: vec![] }),
      DetectorOptions::new("unused.bin").running_mode(RunningMode::Video),
      AnnotateOptions::default(),
    );
    assert!(matches!(
      detector.detect_image(&test_image()),
      Err(DetectorError::InvalidRunningMode { .. })
    ));

    let detector = FaceDetector::with_engine(
      Box::new(StubEngine { faces: vec![] }),
      DetectorOptions::new("unused.bin").running_mode(RunningMode::LiveStream),
      AnnotateOptions::default(),
    );
    assert!(matches!(
      detector.detect_image(&test_image()),
      Err(DetectorError::InvalidRunningMode { .. })
    ));
  }

  #[test]
  fn detect_after_release_returns_none() {
    let mut detector = stub_detector(vec![]);
    assert!(!detector.is_released());
    detector.release();
    assert!(detector.is_released());
    assert!(detector.detect_image(&test_image()).unwrap().is_none());
  }

  #[test]
  fn release_is_idempotent() {
    let mut detector = stub_detector(vec![]);
    detector.release();
    detector.release();
    assert!(detector.is_released());
  }

  #[test]
  fn engine_failure_yields_no_result() {
    let detector = FaceDetector::with_engine(
      Box::new(FailingEngine),
      DetectorOptions::new("unused.bin"),
      AnnotateOptions::default(),
    );
    assert!(detector.detect_image(&test_image()).unwrap().is_none());
  }

  #[cfg(feature = "engine_seeta")]
  #[test]
  fn missing_model_leaves_detector_unavailable() {
    let detector = FaceDetector::new(
      DetectorOptions::new("/nonexistent/model.bin"),
      AnnotateOptions::default(),
    );
    assert!(detector.is_released());
    assert!(detector.detect_image(&test_image()).unwrap().is_none());
  }
}
