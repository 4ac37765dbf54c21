// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Synthetic inspection generator for the live feed and history seeding

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_distr::{Bernoulli, Distribution, Uniform};

use super::{DefectType, InspectionRecord, InspectionStatus};
use crate::config::SimulatorConfig;
use crate::error::{MonitorError, Result};

/// Inspection sites, each watched by exactly one camera
pub const SITES: [(&str, &str); 6] = [
    ("Highway I-95 North - Mile 42", "CAM-001"),
    ("Highway I-95 South - Mile 38", "CAM-002"),
    ("Route 66 East - Checkpoint A", "CAM-003"),
    ("Route 66 West - Checkpoint B", "CAM-004"),
    ("Interstate 80 - Weigh Station", "CAM-005"),
    ("Highway 101 - Toll Plaza", "CAM-006"),
];

/// Maximum defects reported for a single inspection
pub const MAX_DEFECTS: usize = 3;

const DEFECT_PROBABILITY: f64 = 0.4;
const PLATE_LETTERS: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ";
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const IMAGES_PER_INSPECTION: usize = 2;

/// Produces one fully populated inspection per call
pub struct InspectionGenerator {
    rng: StdRng,
    classifier: Bernoulli,
    plate_failure: Bernoulli,
    defect_draw: Bernoulli,
    confidence: Uniform<f64>,
    processing_ms: Uniform<u64>,
}

impl InspectionGenerator {
    pub fn new(config: &SimulatorConfig) -> Result<Self> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Deterministic generator for reproducible runs and tests
    pub fn from_seed(config: &SimulatorConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SimulatorConfig, rng: StdRng) -> Result<Self> {
        let classifier = Bernoulli::new(config.unsafe_probability)
            .map_err(|e| MonitorError::validation(format!("unsafe_probability: {}", e)))?;
        let plate_failure = Bernoulli::new(config.plate_failure_probability)
            .map_err(|e| MonitorError::validation(format!("plate_failure_probability: {}", e)))?;
        let defect_draw = Bernoulli::new(DEFECT_PROBABILITY)
            .map_err(|e| MonitorError::validation(e.to_string()))?;

        Ok(Self {
            rng,
            classifier,
            plate_failure,
            defect_draw,
            confidence: Uniform::new(0.75, 0.99),
            processing_ms: Uniform::new(150, 500),
        })
    }

    /// Inspection captured now
    pub fn generate(&mut self) -> InspectionRecord {
        self.generate_at(Utc::now())
    }

    /// Inspection captured at a random point within `window` before now
    pub fn generate_backdated(&mut self, window: Duration) -> InspectionRecord {
        let span = window.num_milliseconds().max(1);
        let offset = self.rng.gen_range(0..span);
        self.generate_at(Utc::now() - Duration::milliseconds(offset))
    }

    pub fn generate_at(&mut self, timestamp: DateTime<Utc>) -> InspectionRecord {
        let is_unsafe = self.classifier.sample(&mut self.rng);
        let (location, camera_id) = SITES[self.rng.gen_range(0..SITES.len())];

        let license_plate = if self.plate_failure.sample(&mut self.rng) {
            None
        } else {
            Some(self.draw_plate())
        };

        let defect_types = if is_unsafe {
            self.draw_defects()
        } else {
            Vec::new()
        };

        let image_urls = (0..IMAGES_PER_INSPECTION)
            .map(|_| format!("https://picsum.photos/seed/{}/640/480", self.rng.gen::<u32>()))
            .collect();

        InspectionRecord {
            inspection_id: self.draw_id("INS", timestamp),
            timestamp,
            location: location.to_string(),
            camera_id: camera_id.to_string(),
            license_plate,
            status: if is_unsafe {
                InspectionStatus::Unsafe
            } else {
                InspectionStatus::Safe
            },
            defect_types,
            confidence: self.confidence.sample(&mut self.rng),
            image_urls,
            processing_duration_ms: self.processing_ms.sample(&mut self.rng),
        }
    }

    /// Identifier of the form `<prefix>-<millis>-<6 base36 chars>`
    pub fn draw_id(&mut self, prefix: &str, at: DateTime<Utc>) -> String {
        let suffix: String = (0..6)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("{}-{}-{}", prefix, at.timestamp_millis(), suffix)
    }

    /// Random integer in `range`, used by history seeding
    pub fn roll(&mut self, range: std::ops::Range<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    fn draw_plate(&mut self) -> String {
        let mut plate = String::with_capacity(8);
        for _ in 0..3 {
            plate.push(PLATE_LETTERS[self.rng.gen_range(0..PLATE_LETTERS.len())] as char);
        }
        plate.push('-');
        for _ in 0..4 {
            plate.push(char::from(b'0' + self.rng.gen_range(0..10u8)));
        }
        plate
    }

    fn draw_defects(&mut self) -> Vec<DefectType> {
        let limit = self.rng.gen_range(1..=MAX_DEFECTS);
        let mut defects: Vec<DefectType> = DefectType::ALL
            .iter()
            .copied()
            .filter(|_| self.defect_draw.sample(&mut self.rng))
            .take(limit)
            .collect();

        // An unsafe verdict always names at least one defect
        if defects.is_empty() {
            defects.push(DefectType::ALL[self.rng.gen_range(0..DefectType::ALL.len())]);
        }
        defects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(unsafe_probability: f64, seed: u64) -> InspectionGenerator {
        let config = SimulatorConfig {
            unsafe_probability,
            ..SimulatorConfig::default()
        };
        InspectionGenerator::from_seed(&config, seed).unwrap()
    }

    #[test]
    fn test_generated_records_are_valid() {
        let mut gen = generator(0.5, 7);
        for _ in 0..500 {
            let rec = gen.generate();
            rec.validate().unwrap();
            assert!(rec.defect_types.len() <= MAX_DEFECTS);
            assert!((0.75..0.99).contains(&rec.confidence));
            assert!((150..500).contains(&rec.processing_duration_ms));
            assert_eq!(rec.image_urls.len(), IMAGES_PER_INSPECTION);
        }
    }

    #[test]
    fn test_location_camera_pairing() {
        let mut gen = generator(0.25, 11);
        for _ in 0..200 {
            let rec = gen.generate();
            let site = SITES.iter().find(|(loc, _)| *loc == rec.location).unwrap();
            assert_eq!(site.1, rec.camera_id);
        }
    }

    #[test]
    fn test_plate_format() {
        let mut gen = generator(0.25, 3);
        let plates: Vec<String> = (0..200).filter_map(|_| gen.generate().license_plate).collect();
        assert!(!plates.is_empty());

        for plate in plates {
            let bytes = plate.as_bytes();
            assert_eq!(bytes.len(), 8);
            assert!(bytes[..3].iter().all(|b| PLATE_LETTERS.contains(b)));
            assert_eq!(bytes[3], b'-');
            assert!(bytes[4..].iter().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_classifier_extremes() {
        let mut always = generator(1.0, 1);
        assert!((0..50).all(|_| always.generate().is_unsafe()));

        let mut never = generator(0.0, 1);
        assert!((0..50).all(|_| !never.generate().is_unsafe()));
    }

    #[test]
    fn test_backdated_within_window() {
        let mut gen = generator(0.25, 5);
        let window = Duration::hours(24);
        let now = Utc::now();
        for _ in 0..100 {
            let rec = gen.generate_backdated(window);
            assert!(rec.timestamp <= Utc::now());
            assert!(rec.timestamp >= now - window - Duration::seconds(1));
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let at = Utc::now();
        let mut a = generator(0.25, 99);
        let mut b = generator(0.25, 99);
        assert_eq!(a.generate_at(at), b.generate_at(at));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let config = SimulatorConfig {
            plate_failure_probability: -0.1,
            ..SimulatorConfig::default()
        };
        assert!(InspectionGenerator::from_seed(&config, 1).is_err());
    }
}
