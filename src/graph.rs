use std::ops::Range;

/// 拖动翻页阈值下限（像素）
pub const MIN_DRAG_THRESHOLD: f32 = 1.0;

/// 图表中可见的连续月份窗口，拖动翻页
#[derive(Debug, Clone, PartialEq)]
pub struct GraphWindow {
    start: usize,
    len: usize,
    window: usize,
    acc: f32,
    threshold: f32,
}

impl GraphWindow {
    /// 默认显示最近的 `window` 个月
    pub fn new(len: usize, window: usize, threshold: f32) -> Self {
        let window = window.max(1);
        Self {
            start: len.saturating_sub(window),
            len,
            window,
            acc: 0.0,
            threshold: threshold.max(MIN_DRAG_THRESHOLD),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..(self.start + self.window).min(self.len)
    }

    /// 累计横向拖动距离，左拖看更新的月份，右拖看更早的
    pub fn drag(&mut self, dx: f32) {
        self.acc += dx;
        if self.acc <= -self.threshold {
            if self.start + self.window < self.len {
                self.start += 1;
            }
            self.acc = 0.0;
        } else if self.acc >= self.threshold {
            if self.start > 0 {
                self.start -= 1;
            }
            self.acc = 0.0;
        }
    }

    /// 账单数量变化后重新定位，保持窗口合法
    pub fn resize(&mut self, len: usize) {
        if len != self.len {
            *self = Self::new(len, self.window, self.threshold);
        }
    }
}

// 绘图区边距
const LEFT: f32 = 40.0;
const BOTTOM: f32 = 32.0;
const RIGHT: f32 = 8.0;
const TOP: f32 = 8.0;

/// 把金额映射到绘图区坐标
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScale {
    pub x0: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub nice_max: f64,
    points: usize,
}

impl ChartScale {
    /// `origin` 为绘图区左上角，`size` 为宽高
    pub fn new(values: &[f64], points: usize, origin: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            x0: origin.0 + LEFT,
            right: origin.0 + size.0 - RIGHT,
            top: origin.1 + TOP,
            bottom: origin.1 + size.1 - BOTTOM,
            nice_max: nice_max(values),
            points: points.max(1),
        }
    }

    pub fn x(&self, index: usize) -> f32 {
        if self.points == 1 {
            return self.x0;
        }
        let dx = (self.right - self.x0) / (self.points - 1) as f32;
        self.x0 + index as f32 * dx
    }

    pub fn y(&self, value: f64) -> f32 {
        self.bottom - ((value / self.nice_max) as f32) * (self.bottom - self.top)
    }

    pub fn polyline(&self, values: &[f64]) -> Vec<(f32, f32)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.x(i), self.y(*v)))
            .collect()
    }
}

/// 向上取整到 100，至少 100
pub fn nice_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(1.0_f64, f64::max);
    ((max / 100.0).ceil() * 100.0).max(100.0)
}
