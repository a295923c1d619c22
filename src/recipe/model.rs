/// A recipe as extracted from one detail page
///
/// Optional fields are `None` when the page did not yield a value; they are
/// never filled with placeholders such as `0` or an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    /// Site-assigned identity
    pub id: Option<i64>,

    /// Primary heading; empty when the heading could not be read
    pub name: String,

    pub serves_count: Option<f64>,

    pub difficulty: Option<String>,

    /// ISO-8601 duration, verbatim (e.g. "PT15M")
    pub prep_time: Option<String>,

    /// ISO-8601 duration, verbatim
    pub cook_time: Option<String>,

    /// Aggregate rating from embedded structured metadata, truncated
    pub rating: Option<u8>,

    pub description: Option<String>,

    /// Tag labels, in page order
    pub features: Vec<String>,

    /// Ingredient lines, in page order
    pub ingredients: Vec<String>,

    /// One entry per method step, in page order
    pub method: Vec<String>,

    pub comments: Option<Vec<String>>,

    pub nutrition: Option<Nutrition>,

    /// Raw bytes of the primary photo
    pub image: Option<Vec<u8>>,
}

/// Per-serving nutrition values; `None` means "not reported"
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub protein: Option<f64>,
    pub saturates: Option<f64>,
    pub carbs: Option<f64>,
    pub sugar: Option<f64>,
    pub fibre: Option<f64>,
    pub salt: Option<f64>,
}

impl Nutrition {
    /// Returns true when no nutrient was reported
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    /// Nutrient names paired with their values, in storage order
    pub fn fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("calories", self.calories),
            ("fat", self.fat),
            ("protein", self.protein),
            ("saturates", self.saturates),
            ("carbs", self.carbs),
            ("sugar", self.sugar),
            ("fibre", self.fibre),
            ("salt", self.salt),
        ]
    }
}
