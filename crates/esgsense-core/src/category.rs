//! ESG category table: the single keyword table shared by every pass that
//! categorizes themes.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Theme category. Declaration order is the matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EsgCategory {
    Environmental,
    Social,
    Governance,
    Economic,
    Technology,
    Political,
}

const ENVIRONMENTAL_KEYWORDS: &[&str] = &[
    "WB_1331_HEALTH_TECHNOLOGIES",
    "UNGP_FORESTS_RIVERS_OCEANS",
    "NATURAL_DISASTER",
    "TAX_ETHNICITY_CHINESE",
    "TAX_WORLDLANGUAGES_CHINESE",
];

const SOCIAL_KEYWORDS: &[&str] = &[
    "WB_615_GENDER",
    "WB_924_VOICE_AND_AGENCY",
    "WB_621_HEALTH_NUTRITION_AND_POPULATION",
    "GENERAL_HEALTH",
    "MEDICAL",
    "TAX_DISEASE",
    "WB_926_POLITICAL_PARTICIPATION",
];

const GOVERNANCE_KEYWORDS: &[&str] = &[
    "WB_831_GOVERNANCE",
    "WB_832_ANTI_CORRUPTION",
    "WB_2019_ANTI_CORRUPTION_LEGISLATION",
    "WB_2020_BRIBERY_FRAUD_AND_COLLUSION",
    "CORRUPTION",
    "LEGISLATION",
    "EPU_POLICY",
    "WB_845_LEGAL_AND_REGULATORY_FRAMEWORK",
    "WB_696_PUBLIC_SECTOR_MANAGEMENT",
    "WB_969_CAPITAL_MARKETS_LAW_AND_REGULATION",
    "TAX_FNCACT_EXECUTIVES",
];

const ECONOMIC_KEYWORDS: &[&str] = &["ECON_STOCKMARKET", "TAX_ECON_PRICE", "WB_698_TRADE"];

const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "WB_678_DIGITAL_GOVERNMENT",
    "WB_694_BROADCAST_AND_MEDIA",
    "WB_133_INFORMATION_AND_COMMUNICATION_TECHNOLOGIES",
    "SOC_EMERGINGTECH",
    "WB_652_ICT_APPLICATIONS",
    "WB_662_SOCIAL_MEDIA",
];

const POLITICAL_KEYWORDS: &[&str] = &[
    "USPEC_POLITICS_GENERAL1",
    "TAX_POLITICAL_PARTY",
    "ELECTION",
    "TAX_FNCACT_PRESIDENT",
];

impl EsgCategory {
    /// All categories in matching priority order.
    pub const ALL: [EsgCategory; 6] = [
        Self::Environmental,
        Self::Social,
        Self::Governance,
        Self::Economic,
        Self::Technology,
        Self::Political,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Environmental => "Environmental",
            Self::Social => "Social",
            Self::Governance => "Governance",
            Self::Economic => "Economic",
            Self::Technology => "Technology",
            Self::Political => "Political",
        }
    }

    /// Keyword substrings owned by this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Environmental => ENVIRONMENTAL_KEYWORDS,
            Self::Social => SOCIAL_KEYWORDS,
            Self::Governance => GOVERNANCE_KEYWORDS,
            Self::Economic => ECONOMIC_KEYWORDS,
            Self::Technology => TECHNOLOGY_KEYWORDS,
            Self::Political => POLITICAL_KEYWORDS,
        }
    }

    /// Whether any keyword of this category is a substring of `theme`.
    pub fn matches(&self, theme: &str) -> bool {
        self.keywords().iter().any(|kw| theme.contains(kw))
    }

    /// First category (in priority order) matching `theme`.
    pub fn classify(theme: &str) -> Option<EsgCategory> {
        Self::ALL.iter().copied().find(|c| c.matches(theme))
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for EsgCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category theme counts. Every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: [usize; 6],
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: EsgCategory) -> usize {
        self.counts[category.index()]
    }

    pub fn increment(&mut self, category: EsgCategory) {
        self.counts[category.index()] += 1;
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &CategoryCounts) {
        for (acc, n) in self.counts.iter_mut().zip(other.counts.iter()) {
            *acc += n;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(category, count)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EsgCategory, usize)> + '_ {
        EsgCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Pairs sorted by count descending. The sort is stable, so equal counts
    /// keep declaration order.
    pub fn ranked(&self) -> Vec<(EsgCategory, usize)> {
        let mut pairs: Vec<(EsgCategory, usize)> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1));
        pairs
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.name(), &count)?;
        }
        map.end()
    }
}
