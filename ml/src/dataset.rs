use crate::preprocess::{self, INPUT_SIZE};
use anyhow::{Context, Result, anyhow, ensure};
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::{collections::BTreeMap, fs, path::PathBuf, sync::Arc};
use walkdir::WalkDir;

/// Where the labelled scans live and how to size them.
#[derive(Clone, Debug)]
pub struct ScanDatasetConfig {
    /// Directory with one sub-directory per class (`<data_dir>/<class>/<image>`).
    pub data_dir: PathBuf,
    /// Target width after resizing.
    pub width: u32,
    /// Target height after resizing.
    pub height: u32,
}

impl ScanDatasetConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            width: INPUT_SIZE,
            height: INPUT_SIZE,
        }
    }
}

/// Proportions and seed for [`ScanDataset::split`].
#[derive(Clone, Copy, Debug)]
pub struct SplitConfig {
    /// Share of every class held out for testing, in `(0, 1)`.
    pub test_fraction: f32,
    /// Share of every class held out for validation, in `[0, 1)`.
    pub val_fraction: f32,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            val_fraction: 0.1,
            seed: 42,
        }
    }
}

/// One decoded scan: HWC RGB pixels in `[0, 1]` and its class index.
#[derive(Clone, Debug)]
pub struct ScanSample {
    pub pixels: Vec<f32>,
    pub label: usize,
    pub source: PathBuf,
}

/// In-memory scans plus the class names they are labelled with.
///
/// Partitions produced by [`split`](Self::split) share the decoded samples.
#[derive(Clone)]
pub struct ScanDataset {
    samples: Arc<Vec<ScanSample>>,
    indices: Arc<Vec<usize>>,
    labels: Arc<Vec<String>>,
    width: u32,
    height: u32,
}

/// Train / validation / test partitions of one dataset.
#[derive(Clone)]
pub struct DatasetSplit {
    pub train: ScanDataset,
    pub validation: ScanDataset,
    pub test: ScanDataset,
}

impl ScanDataset {
    /// Walks `config.data_dir`, decoding every image of every class folder.
    ///
    /// Class indices follow the sorted folder names. Files that fail to decode
    /// are skipped with a warning.
    pub fn load(config: &ScanDatasetConfig) -> Result<Self> {
        ensure!(
            config.data_dir.is_dir(),
            "data directory does not exist: {}",
            config.data_dir.display()
        );

        let mut labels = Vec::new();
        for entry in fs::read_dir(&config.data_dir)
            .with_context(|| format!("cannot read {}", config.data_dir.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                labels.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        labels.sort();
        ensure!(
            !labels.is_empty(),
            "no class folders under {}",
            config.data_dir.display()
        );

        let label_map: BTreeMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        info!("label mapping: {label_map:?}");

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for (label, class_name) in labels.iter().enumerate() {
            let class_dir = config.data_dir.join(class_name);
            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("skipping unreadable entry in {}: {err}", class_dir.display());
                        skipped += 1;
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                match preprocess::load_image(path) {
                    Ok(image) => {
                        let tensor =
                            preprocess::preprocess_with_size(&image, config.width, config.height);
                        samples.push(ScanSample {
                            pixels: tensor.into_data(),
                            label,
                            source: path.to_path_buf(),
                        });
                    }
                    Err(err) => {
                        warn!("skipping image: {err}");
                        skipped += 1;
                    }
                }
            }
        }

        if samples.is_empty() {
            return Err(anyhow!(
                "no readable images under {}",
                config.data_dir.display()
            ));
        }
        info!(
            "loaded {} images in {} classes ({} skipped)",
            samples.len(),
            labels.len(),
            skipped
        );

        let indices = (0..samples.len()).collect();
        Ok(Self {
            samples: Arc::new(samples),
            indices: Arc::new(indices),
            labels: Arc::new(labels),
            width: config.width,
            height: config.height,
        })
    }

    fn with_indices(&self, indices: Vec<usize>) -> Self {
        Self {
            samples: self.samples.clone(),
            indices: Arc::new(indices),
            labels: self.labels.clone(),
            width: self.width,
            height: self.height,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScanSample> {
        self.indices.get(index).map(|&idx| &self.samples[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanSample> + '_ {
        self.indices.iter().map(|&idx| &self.samples[idx])
    }

    /// Class names ordered by index.
    pub fn label_names(&self) -> Arc<Vec<String>> {
        self.labels.clone()
    }

    /// Number of samples per class index.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.labels.len()];
        for sample in self.iter() {
            counts[sample.label] += 1;
        }
        counts
    }

    /// Returns (width, height).
    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Stratified split: every class is shuffled with `config.seed` and cut by
    /// the configured fractions, so each partition keeps the class balance.
    pub fn split(&self, config: &SplitConfig) -> Result<DatasetSplit> {
        ensure!(
            config.test_fraction > 0.0 && config.test_fraction < 1.0,
            "test fraction must be in (0, 1), got {}",
            config.test_fraction
        );
        ensure!(
            config.val_fraction >= 0.0 && config.test_fraction + config.val_fraction < 1.0,
            "validation fraction {} leaves no training data with test fraction {}",
            config.val_fraction,
            config.test_fraction
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut train = Vec::new();
        let mut validation = Vec::new();
        let mut test = Vec::new();

        for class in 0..self.labels.len() {
            let mut members: Vec<usize> = self
                .indices
                .iter()
                .copied()
                .filter(|&idx| self.samples[idx].label == class)
                .collect();
            members.shuffle(&mut rng);

            let total = members.len();
            let test_count = share(total, config.test_fraction);
            let val_count = share(total, config.val_fraction).min(total - test_count);

            let (test_part, rest) = members.split_at(test_count);
            let (val_part, train_part) = rest.split_at(val_count);
            test.extend_from_slice(test_part);
            validation.extend_from_slice(val_part);
            train.extend_from_slice(train_part);
        }

        train.shuffle(&mut rng);
        validation.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok(DatasetSplit {
            train: self.with_indices(train),
            validation: self.with_indices(validation),
            test: self.with_indices(test),
        })
    }
}

fn share(total: usize, fraction: f32) -> usize {
    ((total as f32) * fraction)
        .round()
        .clamp(0.0, total as f32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::Path;

    fn write_class(root: &Path, class: &str, count: usize, shade: u8) {
        let dir = root.join(class);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..count {
            RgbImage::from_pixel(12, 10, Rgb([shade, shade, shade]))
                .save(dir.join(format!("scan_{i:02}.png")))
                .unwrap();
        }
    }

    fn small_config(root: &Path) -> ScanDatasetConfig {
        ScanDatasetConfig {
            data_dir: root.to_path_buf(),
            width: 6,
            height: 6,
        }
    }

    fn sources(dataset: &ScanDataset) -> Vec<PathBuf> {
        dataset.iter().map(|s| s.source.clone()).collect()
    }

    #[test]
    fn labels_follow_sorted_folder_names() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "normal", 2, 10);
        write_class(dir.path(), "cancer", 3, 250);

        let dataset = ScanDataset::load(&small_config(dir.path())).unwrap();
        assert_eq!(dataset.label_names().as_slice(), &["cancer", "normal"]);
        assert_eq!(dataset.class_counts(), vec![3, 2]);
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.image_size(), (6, 6));

        let first = dataset.get(0).unwrap();
        assert_eq!(first.label, 0);
        assert_eq!(first.pixels.len(), 6 * 6 * 3);
        assert!(first.pixels.iter().all(|v| (*v - 250.0 / 255.0).abs() < 1e-6));
    }

    #[test]
    fn unreadable_images_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "cancer", 2, 200);
        fs::write(dir.path().join("cancer").join("broken.png"), b"nope").unwrap();

        let dataset = ScanDataset::load(&small_config(dir.path())).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cancer")).unwrap();
        assert!(ScanDataset::load(&small_config(dir.path())).is_err());

        let missing = dir.path().join("missing");
        assert!(ScanDataset::load(&small_config(&missing)).is_err());
    }

    #[test]
    fn split_is_stratified() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "cancer", 10, 200);
        write_class(dir.path(), "normal", 10, 20);

        let dataset = ScanDataset::load(&small_config(dir.path())).unwrap();
        let split = dataset.split(&SplitConfig::default()).unwrap();

        assert_eq!(split.train.class_counts(), vec![7, 7]);
        assert_eq!(split.validation.class_counts(), vec![1, 1]);
        assert_eq!(split.test.class_counts(), vec![2, 2]);

        let mut all = sources(&split.train);
        all.extend(sources(&split.validation));
        all.extend(sources(&split.test));
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn same_seed_gives_same_split() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "cancer", 8, 200);
        write_class(dir.path(), "normal", 8, 20);
        let dataset = ScanDataset::load(&small_config(dir.path())).unwrap();

        let a = dataset.split(&SplitConfig::default()).unwrap();
        let b = dataset.split(&SplitConfig::default()).unwrap();
        assert_eq!(sources(&a.train), sources(&b.train));
        assert_eq!(sources(&a.test), sources(&b.test));
        assert_eq!(sources(&a.validation), sources(&b.validation));
    }

    #[test]
    fn invalid_fractions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "cancer", 4, 200);
        let dataset = ScanDataset::load(&small_config(dir.path())).unwrap();

        for (test_fraction, val_fraction) in [(0.0, 0.1), (0.6, 0.5), (0.2, -0.1)] {
            let config = SplitConfig {
                test_fraction,
                val_fraction,
                seed: 1,
            };
            assert!(dataset.split(&config).is_err());
        }
    }
}
