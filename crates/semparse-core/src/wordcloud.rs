//! Word-cloud images, one PNG per cluster.

use crate::{Exporter, Result, SemparseError};
use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use nanorand::WyRand;
use once_cell::sync::Lazy;
use palette::{Hsl, IntoColor, Pixel, Srgb};
use regex::Regex;
use semparse_types::{DisplayCluster, DisplayClusterResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wcloud::{Tokenizer, Word, WordCloud, WordCloudSize, DEFAULT_EXCLUDE_WORDS_TEXT};

pub const DEFAULT_CLOUD_WIDTH: u32 = 1000;
pub const DEFAULT_CLOUD_HEIGHT: u32 = 500;

/// Vendor, product and survey boilerplate that would otherwise dominate
/// every cloud. Matched in the listed, lower, upper and capitalized forms.
const EXTRA_STOP_WORDS: &[&str] = &[
    // Vendors
    "Dell", "DellEMC", "DellEMC2", "DellTechnologies", "DellTech", "Alienware", "HPE",
    "HewlettPackardEnterprise", "HP", "Lenovo", "IBM", "Apple", "Acer", "Asus", "Microsoft",
    "Intel", "AMD", "Nvidia", "VMware", "Cisco", "Oracle",
    // Product lines
    "EMC", "Inspiron", "Latitude", "Precision", "OptiPlex", "XPS", "Vostro", "Wyse", "PowerEdge",
    "PowerVault", "EqualLogic", "Compellent",
    // Generic tech
    "Tech", "Technologies", "Technology", "InfoTech", "IT",
    // Survey meta
    "Survey", "Questionnaire", "Respondent", "Response", "Feedback", "N/A", "NA", "None",
    "Nothing", "NotApplicable", "Comment", "Form", "Please", "Thank", "Thanks", "Reviewer", "User",
    // Placeholders
    "Q1", "Q2", "Q3", "Q4", "Q5", "ID", "TicketNumber", "CaseNumber", "RefNumber",
];

static EXTRA_STOP_WORD_FORMS: Lazy<Vec<String>> = Lazy::new(|| {
    EXTRA_STOP_WORDS
        .iter()
        .flat_map(|w| [w.to_string(), w.to_lowercase(), w.to_uppercase(), capitalize(w)])
        .collect()
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']*").expect("valid word regex"));

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Words left out of every cloud.
pub fn stop_words() -> HashSet<&'static str> {
    DEFAULT_EXCLUDE_WORDS_TEXT
        .lines()
        .chain(EXTRA_STOP_WORD_FORMS.iter().map(String::as_str))
        .collect()
}

/// File name for a cluster's image: `Cluster 3` becomes `cluster_3.png`.
pub fn cloud_file_name(label: &str) -> String {
    format!("{}.png", label.to_lowercase().replace([' ', '/'], "_"))
}

/// Renders a word cloud per cluster into a directory.
#[derive(Debug, Clone)]
pub struct WordCloudExporter {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl WordCloudExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            width: DEFAULT_CLOUD_WIDTH,
            height: DEFAULT_CLOUD_HEIGHT,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn output_path(&self, label: &str) -> PathBuf {
        self.dir.join(cloud_file_name(label))
    }
}

#[async_trait]
impl Exporter for WordCloudExporter {
    async fn export_result(&self, data: &DisplayClusterResult) -> Result<()> {
        let exporter = self.clone();
        let data = data.clone();
        tokio::task::spawn_blocking(move || exporter.render_all(&data))
            .await
            .map_err(|e| SemparseError::Export(format!("word cloud task failed: {}", e)))?
    }
}

impl WordCloudExporter {
    fn render_all(&self, data: &DisplayClusterResult) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SemparseError::Export(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let filter = stop_words();
        for cluster in data.clusters() {
            let path = self.output_path(&cluster.label);
            self.render(cluster, &filter, &path)?;
        }

        info!(
            target: "semparse::export",
            "Wrote {} word clouds to {}",
            data.len(),
            self.dir.display()
        );
        Ok(())
    }

    fn render(&self, cluster: &DisplayCluster, filter: &HashSet<&'static str>, path: &Path) -> Result<()> {
        let text = cluster.lines.join(" ");

        let image = if has_cloud_words(&text, filter) {
            let tokenizer = Tokenizer::default()
                .with_max_words(100_000)
                .with_filter(filter.clone())
                .with_repeat(true);
            let cloud = WordCloud::default()
                .with_tokenizer(tokenizer)
                .with_rng_seed(0);
            let size = WordCloudSize::FromDimensions {
                width: self.width,
                height: self.height,
            };
            cloud.generate_from_text_with_color_func(&text, size, 1.0, shade_by_frequency)
        } else {
            debug!(
                target: "semparse::export",
                "{} has no words left after filtering, writing a blank image",
                cluster.label
            );
            RgbaImage::from_pixel(self.width, self.height, Rgba([0, 0, 0, 0]))
        };

        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| SemparseError::Export(format!("cannot write {}: {}", path.display(), e)))
    }
}

fn has_cloud_words(text: &str, filter: &HashSet<&'static str>) -> bool {
    WORD.find_iter(text).any(|m| !filter.contains(m.as_str()))
}

/// Light blue, more saturated for more frequent words.
fn shade_by_frequency(word: &Word, _rng: &mut WyRand) -> Rgba<u8> {
    let saturation = match (word.frequency * 100.0) as u8 {
        90..=100 => word.frequency,
        20..=89 => 1.0,
        10..=19 => 0.8,
        6..=9 => 0.6,
        3..=5 => 0.3,
        _ => 0.2,
    };
    let rgb: Srgb = Hsl::new(200.0, saturation, 0.5).into_color();
    let [r, g, b]: [u8; 3] = rgb.into_format().into_raw();
    Rgba([r, g, b, 255])
}
