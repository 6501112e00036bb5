use autopost_core::{types::COLUMN_COUNT, Job, JobId};
use autopost_scheduler::parse_row;
use clap::Args;

/// Append one job row to the store.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub product: String,

    /// facebook or instagram.
    #[arg(long)]
    pub platform: String,

    /// Time of day, HH:MM.
    #[arg(long)]
    pub time: String,

    /// Date, YYYY-MM-DD.
    #[arg(long)]
    pub date: String,

    /// once or daily.
    #[arg(long, default_value = "once")]
    pub mode: String,

    #[arg(long)]
    pub caption: String,

    #[arg(long, default_value = "")]
    pub keywords: String,

    /// Public image URL. Required for Instagram.
    #[arg(long, default_value = "")]
    pub image: String,

    /// Access token for this post; empty uses the configured default.
    #[arg(long, default_value = "")]
    pub token: String,

    /// Page / account id for this post; empty uses the configured default.
    #[arg(long, default_value = "")]
    pub account_id: String,
}

impl ScheduleArgs {
    /// Cells in store column order.
    pub fn to_row(&self) -> Vec<String> {
        let row = vec![
            self.product.clone(),
            self.keywords.clone(),
            self.platform.clone(),
            self.time.clone(),
            self.token.clone(),
            self.account_id.clone(),
            self.mode.clone(),
            self.date.clone(),
            self.caption.clone(),
            self.image.clone(),
        ];
        debug_assert_eq!(row.len(), COLUMN_COUNT);
        row
    }

    /// Run the row through the scheduler's own validator.
    pub fn validate(&self) -> anyhow::Result<(Vec<String>, Job)> {
        let row = self.to_row();
        let job = parse_row(JobId::fingerprint(&row, 0), &row)
            .map_err(|issue| anyhow::anyhow!("row rejected: {issue}"))?;
        if job.platform == "instagram" && job.image.is_none() {
            anyhow::bail!("row rejected: Instagram posts need --image");
        }
        Ok((row, job))
    }
}

#[cfg(test)]
mod tests {
    use autopost_core::Mode;

    use super::*;

    fn args() -> ScheduleArgs {
        ScheduleArgs {
            product: "ProductA".into(),
            platform: "Facebook".into(),
            time: "09:00".into(),
            date: "2024-01-01".into(),
            mode: "daily".into(),
            caption: "Hello".into(),
            keywords: "kw".into(),
            image: String::new(),
            token: String::new(),
            account_id: String::new(),
        }
    }

    #[test]
    fn row_follows_column_order() {
        let row = args().to_row();
        assert_eq!(row[2], "Facebook");
        assert_eq!(row[3], "09:00");
        assert_eq!(row[6], "daily");
        assert_eq!(row[7], "2024-01-01");
        assert_eq!(row[8], "Hello");
    }

    #[test]
    fn valid_args_pass() {
        let (_, job) = args().validate().unwrap();
        assert_eq!(job.mode, Mode::Daily);
        assert_eq!(job.platform, "facebook");
    }

    #[test]
    fn bad_time_is_rejected() {
        let mut a = args();
        a.time = "25:70".into();
        assert!(a.validate().is_err());
    }

    #[test]
    fn instagram_needs_an_image() {
        let mut a = args();
        a.platform = "instagram".into();
        let err = a.validate().unwrap_err();
        assert!(err.to_string().contains("--image"));
        a.image = "https://cdn.example.com/a.jpg".into();
        assert!(a.validate().is_ok());
    }
}
