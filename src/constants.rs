pub const ANONYMOUS_USERNAME: &str = "Anonymous";

pub const AUDIENCE_REVIEW_KIND: &str = "audience";

pub mod judgment {

    /// Reasoning text carried by a placeholder row until the judge answers.
    pub const PENDING_REASONING: &str = "Analysis in progress";

    pub const FALLBACK_REASONING: &str = "analysis failed";

    pub const FALLBACK_QUALITY: f64 = 0.1;
}

pub mod scoring {

    /// Star rating at or above which a review counts as "fresh".
    pub const FRESH_THRESHOLD: f64 = 3.5;

    /// Rescales the 0-5 star domain to 0-100.
    pub const STAR_TO_PERCENT: f64 = 20.0;
}
