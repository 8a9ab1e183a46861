// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Utc};
use image::DynamicImage;
use image::buffer::ConvertBuffer;
use thiserror::Error;
use tracing::debug;

use crate::{FromUrl, FromUrlWithScheme, detector::ResultBundle, output::Render};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按日期分层的目录记录：标注图像存为 PNG，旁边写入检测结果的 JSON 记录。
/// 默认只记录非空结果，URI 查询参数 `always` 连同空结果一并记录。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counters: Arc<Mutex<u16>>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      frame_counters: Arc::new(Mutex::new(0)),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    let mut counter = self.frame_counters.lock().unwrap();
    let id = *counter + 1;
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  fn record(
    &self,
    path: &PathBuf,
    result: &ResultBundle,
  ) -> Result<(), DirectoryRecordOutputError> {
    let faces: Vec<serde_json::Value> = result
      .detections
      .iter()
      .map(|face| {
        serde_json::json!({
          "score": face.score,
          "bbox": face.bbox,
        })
      })
      .collect();

    let record = serde_json::json!({
      "inference_ms": result.inference_time.as_millis() as u64,
      "width": result.input_width,
      "height": result.input_height,
      "faces": faces,
    });

    std::fs::write(path.with_extension("json"), record.to_string())?;
    Ok(())
  }
}

impl Render<DynamicImage, ResultBundle> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, _frame: &DynamicImage, result: &ResultBundle) -> Result<(), Self::Error> {
    if !self.always && result.detections.is_empty() {
      debug!("没有检测结果，跳过记录");
      return Ok(());
    }

    let path = self.frame_path()?;
    let rgb: image::RgbImage = result.annotated.convert();
    rgb.save(&path)?;
    self.record(&path, result)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scheme_mismatch_is_rejected() {
    let url = url::Url::parse("image:///tmp/out.png").unwrap();
    assert!(matches!(
      DirectoryRecordOutput::from_url(&url),
      Err(DirectoryRecordOutputError::SchemeMismatch)
    ));
  }

  #[test]
  fn always_flag_is_parsed_from_query() {
    let url = url::Url::parse("folder:///tmp/records?always").unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    assert!(output.always);

    let url = url::Url::parse("folder:///tmp/records").unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    assert!(!output.always);
  }
}
