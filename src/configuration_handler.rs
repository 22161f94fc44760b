use crate::configuration::Configuration;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Dental clinic appointment manager")]
pub struct ConfigurationHandler {
    /// Title shown on the page
    #[arg(long = "title", env = "APPOINTMENTS_TITLE", default_value = "Dental Clinic Appointments")]
    website_title: String,

    #[arg(long, env = "APPOINTMENTS_PORT", default_value = "3000")]
    port: String,

    /// Name of the cookie holding the appointment list
    #[arg(long, env = "APPOINTMENTS_COOKIE_NAME", default_value = "citasClinicaDentalBeatriz")]
    cookie_name: String,

    #[arg(long, env = "APPOINTMENTS_EXPIRY_DAYS", default_value_t = 30)]
    expiry_days: i64,

    /// Cookie size at which the page starts warning about the browser limit
    #[arg(long, env = "APPOINTMENTS_SIZE_WARNING_BYTES", default_value_t = 3800)]
    size_warning_bytes: usize,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn website_title(&self) -> String {
        self.website_title.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn cookie_name(&self) -> String {
        self.cookie_name.clone()
    }

    fn expiry_days(&self) -> i64 {
        self.expiry_days
    }

    fn size_warning_bytes(&self) -> usize {
        self.size_warning_bytes
    }
}
