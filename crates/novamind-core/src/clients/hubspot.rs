//! HubSpot CRM client with a simulation fallback
//!
//! The operating mode is decided once in [`HubSpotClient::connect`]: without a
//! token, or when the read-only probe fails, the client runs simulated and never
//! touches the network again. Every later call branches on that stored mode.

use crate::config::HubSpotConfig;
use crate::error::{NovaMindError, Result};
use crate::storage::CampaignActivityLog;
use novamind_types::{Contact, EngagementStats, NewsletterDraft};
use rand::Rng;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmMode {
    Live,
    Simulated,
}

pub struct HubSpotClient {
    mode: CrmMode,
    api_key: Option<String>,
    base_url: String,
    http_client: HttpClient,
    activity_log: CampaignActivityLog,
}

impl HubSpotClient {
    /// Build the client and probe the API to pick live or simulated mode
    pub async fn connect(config: HubSpotConfig, activity_log: CampaignActivityLog) -> Result<Self> {
        let mut client = Self::build(config, activity_log, CrmMode::Simulated)?;

        if client.api_key.is_none() {
            log::warn!("HUBSPOT_API_KEY not found. Using simulation mode.");
            return Ok(client);
        }

        if client.check_connection().await {
            client.mode = CrmMode::Live;
        } else {
            log::warn!("Switching to simulation mode.");
        }

        Ok(client)
    }

    /// Build a client that is simulated regardless of configured credentials
    pub fn simulated(config: HubSpotConfig, activity_log: CampaignActivityLog) -> Result<Self> {
        Self::build(config, activity_log, CrmMode::Simulated)
    }

    fn build(config: HubSpotConfig, activity_log: CampaignActivityLog, mode: CrmMode) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NovaMindError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            mode,
            api_key: config.token().map(|s| s.to_string()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            activity_log,
        })
    }

    pub fn mode(&self) -> CrmMode {
        self.mode
    }

    pub fn simulation_mode(&self) -> bool {
        self.mode == CrmMode::Simulated
    }

    fn token(&self) -> Result<&str> {
        self.api_key.as_deref()
            .ok_or_else(|| NovaMindError::Config("HubSpot API key is required in live mode".to_string()))
    }

    /// Read-only probe: list a single contact
    async fn check_connection(&self) -> bool {
        let Some(token) = self.api_key.as_deref() else {
            return false;
        };

        let url = format!("{}/crm/v3/objects/contacts?limit=1", self.base_url);

        match self.http_client.get(&url).bearer_auth(token).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                log::info!("✅ Successfully connected to HubSpot API.");
                true
            }
            Ok(response) => {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                log::error!("❌ HubSpot connection failed ({}): {}", status, error_text);
                false
            }
            Err(e) => {
                log::error!("❌ HubSpot connection error: {}", e);
                false
            }
        }
    }

    /// Upsert a contact by email and return its CRM id
    pub async fn create_or_update_contact(&self, contact: &Contact) -> Result<String> {
        if self.simulation_mode() {
            log::info!("   [SIM] Created contact: {}", contact.email);
            return Ok(format!("sim_{}", contact.email));
        }

        let token = self.token()?;

        match self.search_contact_id(token, &contact.email).await? {
            Some(contact_id) => {
                let url = format!("{}/crm/v3/objects/contacts/{}", self.base_url, contact_id);

                let response = self.http_client
                    .patch(&url)
                    .bearer_auth(token)
                    .json(&json!({ "properties": contact_properties(contact, false) }))
                    .send()
                    .await?;

                let status = response.status();
                if status != StatusCode::OK {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(NovaMindError::ServiceUnavailable(
                        format!("HubSpot update failed ({}): {}", status, error_text)
                    ));
                }

                log::info!("   ✅ Updated contact: {}", contact.email);
                Ok(contact_id)
            }
            None => {
                let url = format!("{}/crm/v3/objects/contacts", self.base_url);

                let response = self.http_client
                    .post(&url)
                    .bearer_auth(token)
                    .json(&json!({ "properties": contact_properties(contact, true) }))
                    .send()
                    .await?;

                let status = response.status();
                if status != StatusCode::CREATED {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(NovaMindError::ServiceUnavailable(
                        format!("HubSpot create failed ({}): {}", status, error_text)
                    ));
                }

                let data: Value = response.json().await?;
                let contact_id = data["id"].as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| NovaMindError::Processing("HubSpot create response has no id".to_string()))?;

                log::info!("   ✅ Created contact: {}", contact.email);
                Ok(contact_id)
            }
        }
    }

    async fn search_contact_id(&self, token: &str, email: &str) -> Result<Option<String>> {
        let url = format!("{}/crm/v3/objects/contacts/search", self.base_url);

        let search_payload = json!({
            "filterGroups": [{
                "filters": [{
                    "propertyName": "email",
                    "operator": "EQ",
                    "value": email
                }]
            }]
        });

        let response = self.http_client
            .post(&url)
            .bearer_auth(token)
            .json(&search_payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NovaMindError::ServiceUnavailable(
                format!("HubSpot search failed ({}): {}", status, error_text)
            ));
        }

        let data: Value = response.json().await?;
        Ok(data["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|first| first["id"].as_str())
            .map(|s| s.to_string()))
    }

    /// Upsert every contact, dropping the ones that fail.
    ///
    /// Returns `(email, crm_id)` pairs in input order.
    pub async fn bulk_create_contacts(&self, contacts: &[Contact]) -> Vec<(String, String)> {
        log::info!("👥 Creating/updating {} contacts in HubSpot...", contacts.len());

        let mut contact_map = Vec::with_capacity(contacts.len());
        for contact in contacts {
            match self.create_or_update_contact(contact).await {
                Ok(contact_id) => contact_map.push((contact.email.clone(), contact_id)),
                Err(e) => {
                    log::warn!("   ⚠️  Could not create/update contact {}: {}", contact.email, e);
                }
            }
        }

        log::info!("✅ Processed {} contacts", contact_map.len());
        contact_map
    }

    /// Send a newsletter to a persona segment.
    ///
    /// HubSpot's marketing email API is not called; live mode records the send
    /// in the campaign activity log.
    pub async fn send_email_to_segment(
        &self,
        segment: &str,
        contact_ids: &[String],
        newsletter: &NewsletterDraft,
    ) -> Result<()> {
        log::info!("📧 Sending email to {} segment ({} contacts)...", segment, contact_ids.len());
        log::info!("   Subject: {}", newsletter.subject_line);
        log::info!("   Preview: {}", newsletter.preview_text);

        if self.simulation_mode() {
            log::info!("   [SIM] Email sent successfully");
            return Ok(());
        }

        self.activity_log.append(segment, "sent", contact_ids.len())?;
        log::info!("   ✅ Email sent to {} contacts", contact_ids.len());
        Ok(())
    }

    /// External campaign reference stored with the campaign row
    pub fn campaign_reference(&self) -> String {
        match self.mode {
            CrmMode::Simulated => "sim_campaign".to_string(),
            CrmMode::Live => format!("campaign_{}", uuid::Uuid::new_v4()),
        }
    }

    /// Fabricated engagement numbers for one persona segment
    pub fn generate_simulated_stats(&self, persona_key: &str) -> EngagementStats {
        simulate_engagement(persona_key, &mut rand::thread_rng())
    }
}

fn contact_properties(contact: &Contact, include_email: bool) -> Value {
    let mut properties = json!({
        "firstname": contact.firstname,
        "lastname": contact.lastname,
        "company": contact.company,
        "jobtitle": contact.jobtitle,
        "hs_persona": contact.persona,
    });

    if include_email {
        properties["email"] = json!(contact.email);
    }

    properties
}

/// Open and click percentage bands for a persona
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementBands {
    pub open: (f64, f64),
    pub click: (f64, f64),
}

pub fn engagement_bands(persona_key: &str) -> EngagementBands {
    match persona_key {
        "founders" => EngagementBands { open: (22.0, 32.0), click: (15.0, 25.0) },
        "creatives" => EngagementBands { open: (28.0, 38.0), click: (18.0, 28.0) },
        _ => EngagementBands { open: (20.0, 28.0), click: (12.0, 20.0) },
    }
}

/// Simulated sends per segment. Large enough that every band holds at least one whole count.
const SIMULATED_SENT_MIN: u32 = 150;
const SIMULATED_SENT_MAX: u32 = 200;

/// Draw a consistent set of counts whose derived rates fall inside the persona bands
pub fn simulate_engagement<R: Rng>(persona_key: &str, rng: &mut R) -> EngagementStats {
    let bands = engagement_bands(persona_key);

    let sent = rng.gen_range(SIMULATED_SENT_MIN..=SIMULATED_SENT_MAX);
    let delivered = (sent as f64 * rng.gen_range(0.97..0.99)).floor() as u32;
    let opens = count_within_band(rng, delivered, bands.open);
    let clicks = count_within_band(rng, opens, bands.click);
    let unsubscribes = rng.gen_range(0..=1).min(delivered);

    EngagementStats::from_counts(sent, delivered, opens, clicks, unsubscribes)
}

/// Uniform count `n` with `n / base` inside the percentage band
fn count_within_band<R: Rng>(rng: &mut R, base: u32, band: (f64, f64)) -> u32 {
    let low = (base as f64 * band.0 / 100.0).ceil() as u32;
    let high = ((base as f64 * band.1 / 100.0).floor() as u32).min(base);

    if low > high {
        return ((base as f64 * (band.0 + band.1) / 200.0).round() as u32).min(base);
    }

    rng.gen_range(low..=high)
}
