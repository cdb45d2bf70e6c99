//! Display classification for ranks, comfort levels and impact scores.
//!
//! Every function here is total: each input maps to exactly one tier.

/// Badge tier for a city's position in the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl RankTier {
    /// Unranked snapshots (single-city responses) get the standard tier.
    pub fn from_rank(rank: Option<u32>) -> Self {
        match rank {
            Some(1) => RankTier::Gold,
            Some(2) => RankTier::Silver,
            Some(3) => RankTier::Bronze,
            _ => RankTier::Standard,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            RankTier::Gold => "[1st]",
            RankTier::Silver => "[2nd]",
            RankTier::Bronze => "[3rd]",
            RankTier::Standard => "",
        }
    }
}

/// Tier derived from the backend's comfort-level label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComfortTier {
    Good,
    Moderate,
    Poor,
}

impl ComfortTier {
    /// Substring match, case-insensitive. "good" or "comfortable" wins over "moderate".
    pub fn classify(comfort_level: &str) -> Self {
        let level = comfort_level.to_lowercase();

        if level.contains("good") || level.contains("comfortable") {
            ComfortTier::Good
        } else if level.contains("moderate") {
            ComfortTier::Moderate
        } else {
            ComfortTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComfortTier::Good => "good",
            ComfortTier::Moderate => "moderate",
            ComfortTier::Poor => "poor",
        }
    }

    pub fn marker(&self) -> char {
        match self {
            ComfortTier::Good => '+',
            ComfortTier::Moderate => '~',
            ComfortTier::Poor => '-',
        }
    }
}

/// Tier of a single comfort impact score (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactTier {
    Strong,
    Fair,
    Weak,
}

impl ImpactTier {
    pub const STRONG_THRESHOLD: f64 = 80.0;
    pub const FAIR_THRESHOLD: f64 = 60.0;

    pub fn from_impact(impact: f64) -> Self {
        if impact >= Self::STRONG_THRESHOLD {
            ImpactTier::Strong
        } else if impact >= Self::FAIR_THRESHOLD {
            ImpactTier::Fair
        } else {
            ImpactTier::Weak
        }
    }

    /// Emphasis used when printing the impact value.
    pub fn text_style(&self) -> &'static str {
        match self {
            ImpactTier::Strong => "strong",
            ImpactTier::Fair => "fair",
            ImpactTier::Weak => "weak",
        }
    }

    /// Fill character for the progress bar.
    pub fn bar_fill(&self) -> char {
        match self {
            ImpactTier::Strong => '#',
            ImpactTier::Fair => '=',
            ImpactTier::Weak => '-',
        }
    }
}

/// Render an impact score as a fixed-width bar, e.g. `[######    ]`.
pub fn render_impact_bar(impact: f64, width: usize) -> String {
    let tier = ImpactTier::from_impact(impact);
    let clamped = impact.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;

    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat_n(tier.bar_fill(), filled));
    bar.extend(std::iter::repeat_n(' ', width - filled));
    bar.push(']');
    bar
}
