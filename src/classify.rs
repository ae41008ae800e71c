use std::collections::HashMap;
use std::path::Path;

use image::{GrayImage, Luma};
use imageproc::{
    contours::{BorderType, find_contours},
    contrast::{ThresholdType, threshold},
    edges::canny,
    hough::{LineDetectionOptions, detect_lines},
    region_labelling::{Connectivity, connected_components},
};

/// The fixed four-label taxonomy of the chart classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChartLabel {
    Line,
    Bar,
    Scatter,
    Unknown,
}

impl std::fmt::Display for ChartLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChartLabel::Line => "line chart",
            ChartLabel::Bar => "bar chart",
            ChartLabel::Scatter => "scatter chart",
            ChartLabel::Unknown => "unknown chart",
        };
        f.write_str(s)
    }
}

/// Narration line handed to the external TTS collaborator.
pub fn narration_text(label: ChartLabel) -> String {
    format!("This video shows a {label}")
}

const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

const HOUGH_VOTE_THRESHOLD: u32 = 100;
const LINE_CHART_LINES_OVER: usize = 5;

// Empirically tuned bar-glyph window, exclusive on both ends. Wide enough for
// rectangular bars, narrow enough to reject the full-canvas box and noise.
const BAR_MIN_WIDTH: u32 = 50;
const BAR_MAX_WIDTH: u32 = 200;
const BAR_MIN_HEIGHT: u32 = 50;
const BAR_MAX_HEIGHT: u32 = 300;

const BLOB_BINARIZE_AT: u8 = 128;
const BLOB_MIN_AREA: u32 = 10;
const BLOB_MAX_AREA: u32 = 500;
const SCATTER_BLOBS_OVER: usize = 10;

/// Guess the chart type of an image file.
///
/// Never fails: decode or detector problems degrade to
/// [`ChartLabel::Unknown`] with a warning.
pub fn classify(path: &Path) -> ChartLabel {
    match load_grayscale(path) {
        Ok(gray) => classify_image(&gray),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "chart classification degraded to unknown");
            ChartLabel::Unknown
        }
    }
}

fn load_grayscale(path: &Path) -> crate::ChartcastResult<GrayImage> {
    let img = image::open(path).map_err(|e| {
        crate::ChartcastError::decode(format!(
            "failed to decode image '{}': {e}",
            path.display()
        ))
    })?;
    Ok(img.to_luma8())
}

/// The heuristic itself, over a grayscale image at native resolution.
///
/// Checks run in strict order and the first match wins, so the branches are
/// mutually exclusive by construction:
/// 1. dense straight-line structure -> line chart
/// 2. a bar-sized bounding box among external edge contours -> bar chart
/// 3. many small dark blobs -> scatter chart
/// 4. otherwise unknown
pub fn classify_image(gray: &GrayImage) -> ChartLabel {
    // Too small to carry any chart structure, and below what the detectors
    // can operate on.
    if gray.width() < 2 || gray.height() < 2 {
        return ChartLabel::Unknown;
    }

    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);

    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            // No peak suppression, like the classic Hough accumulator scan.
            suppression_radius: 0,
        },
    );
    if lines.len() > LINE_CHART_LINES_OVER {
        return ChartLabel::Line;
    }

    if has_bar_sized_contour(&edges) {
        return ChartLabel::Bar;
    }

    if count_point_blobs(gray) > SCATTER_BLOBS_OVER {
        return ChartLabel::Scatter;
    }

    ChartLabel::Unknown
}

fn has_bar_sized_contour(edges: &GrayImage) -> bool {
    for contour in find_contours::<u32>(edges) {
        if !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }
        let Some((w, h)) = bounding_box(&contour.points) else {
            continue;
        };
        if w > BAR_MIN_WIDTH && w < BAR_MAX_WIDTH && h > BAR_MIN_HEIGHT && h < BAR_MAX_HEIGHT {
            return true;
        }
    }
    false
}

fn bounding_box(points: &[imageproc::point::Point<u32>]) -> Option<(u32, u32)> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some((max_x - min_x + 1, max_y - min_y + 1))
}

/// Count small dark blobs on the original grayscale image (dark-on-light, the
/// stock blob-detector default): binarize, 8-connected components, keep
/// components with area in `[BLOB_MIN_AREA, BLOB_MAX_AREA]`.
fn count_point_blobs(gray: &GrayImage) -> usize {
    let binary = threshold(gray, BLOB_BINARIZE_AT, ThresholdType::BinaryInverted);
    let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));

    let mut areas: HashMap<u32, u32> = HashMap::new();
    for Luma([label]) in labels.pixels() {
        if *label != 0 {
            *areas.entry(*label).or_insert(0) += 1;
        }
    }

    areas
        .values()
        .filter(|&&area| (BLOB_MIN_AREA..=BLOB_MAX_AREA).contains(&area))
        .count()
}
