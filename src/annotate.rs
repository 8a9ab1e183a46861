// 该文件是 Lianpu （脸谱） 项目的一部分。
// src/annotate.rs - 检测结果标注
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::config::AnnotateOptions;
use crate::engine::Detection;

/// 密度无关单位转像素
pub fn dp_to_px(dp: f32, density: f32) -> f32 {
  dp * density
}

/// 检测结果标注器
pub struct Annotator {
  padding_px: f32,
  stroke_color: Rgba<u8>,
  stroke_width: u32,
}

impl Annotator {
  pub fn new(options: AnnotateOptions) -> Self {
    Annotator {
      padding_px: dp_to_px(options.padding_dp, options.density),
      stroke_color: options.stroke_color,
      stroke_width: options.stroke_width,
    }
  }

  /// 在图像的 RGBA8 副本上为每张检测到的人脸描出扩展后的边框。
  /// 按检测器返回的顺序绘制，重叠的边框按该顺序覆盖；绝不修改输入图像。
  pub fn annotate(&self, image: &DynamicImage, detections: &[Detection]) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let (width, height) = canvas.dimensions();

    for detection in detections {
      self.stroke_box(&mut canvas, &detection.bbox, width, height);
    }

    canvas
  }

  fn stroke_box(&self, canvas: &mut RgbaImage, bbox: &[f32; 4], width: u32, height: u32) {
    // 向四周对称扩展
    let x_min = bbox[0] - self.padding_px;
    let y_min = bbox[1] - self.padding_px;
    let x_max = bbox[2] + self.padding_px;
    let y_max = bbox[3] + self.padding_px;

    // 裁剪到图像边界
    let x_min = x_min.max(0.0);
    let y_min = y_min.max(0.0);
    let x_max = x_max.min(width as f32);
    let y_max = y_max.min(height as f32);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    let left = x_min.floor() as i32;
    let top = y_min.floor() as i32;
    let box_width = (x_max.ceil() as i32 - left) as u32;
    let box_height = (y_max.ceil() as i32 - top) as u32;

    // 从外边框向内逐圈描边
    for t in 0..self.stroke_width {
      let w = box_width.saturating_sub(2 * t);
      let h = box_height.saturating_sub(2 * t);
      if w == 0 || h == 0 {
        break;
      }
      let rect = Rect::at(left + t as i32, top + t as i32).of_size(w, h);
      draw_hollow_rect_mut(canvas, rect, self.stroke_color);
    }
  }
}
