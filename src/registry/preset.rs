//! Built-in endpoint table for the EVE Online API.
//!
//! The complete set of read operations the proxy fronts, as one declarative
//! table: (path, declared parameters in fingerprint order, TTL in seconds).
//! TTLs follow the cache timers published for the Dominion-era API.

use std::time::Duration;

use super::EndpointDescriptor;

const MINUTE: u64 = 60;
const HOUR: u64 = 3600;

/// (path, declared parameters, ttl in seconds)
const EVE_API: &[(&str, &[&str], u64)] = &[
    ("/account/Characters.xml.aspx", &["userID", "apiKey"], HOUR),
    ("/char/AccountBalance.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/char/AssetList.xml.aspx", &["userID", "apiKey", "characterID", "version"], 23 * HOUR),
    ("/char/CharacterSheet.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/char/FacWarStats.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/char/IndustryJobs.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/char/KillLog.xml.aspx", &["userID", "apiKey", "characterID", "beforeKillID"], HOUR),
    ("/char/mailinglists.xml.aspx", &["userID", "apiKey", "characterID"], 6 * HOUR),
    ("/char/MailMessages.xml.aspx", &["userID", "apiKey", "characterID"], 30 * MINUTE),
    ("/char/MarketOrders.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/char/Medals.xml.aspx", &["userID", "apiKey", "characterID"], 23 * HOUR),
    ("/char/Notifications.xml.aspx", &["userID", "apiKey", "characterID"], 30 * MINUTE),
    ("/char/SkillInTraining.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/char/SkillQueue.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/char/Standings.xml.aspx", &["userID", "apiKey", "characterID"], 3 * HOUR),
    ("/char/WalletJournal.xml.aspx", &["userID", "apiKey", "characterID", "accountKey", "beforeRefID"], HOUR),
    ("/char/WalletTransactions.xml.aspx", &["userID", "apiKey", "characterID", "beforeTransID"], HOUR),
    ("/corp/AccountBalance.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/corp/AssetList.xml.aspx", &["userID", "apiKey", "characterID", "version"], 23 * HOUR),
    ("/corp/ContainerLog.xml.aspx", &["userID", "apiKey", "characterID"], 3 * HOUR),
    ("/corp/CorporationSheet.xml.aspx", &["userID", "apiKey", "characterID"], 6 * HOUR),
    ("/corp/FacWarStats.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/IndustryJobs.xml.aspx", &["userID", "apiKey", "characterID"], 15 * MINUTE),
    ("/corp/KillLog.xml.aspx", &["userID", "apiKey", "characterID", "beforeKillID"], HOUR),
    ("/corp/MarketOrders.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/Medals.xml.aspx", &["userID", "apiKey", "characterID"], 23 * HOUR),
    ("/corp/MemberMedals.xml.aspx", &["userID", "apiKey", "characterID"], 23 * HOUR),
    ("/corp/MemberSecurity.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/MemberSecurityLog.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/MemberTracking.xml.aspx", &["userID", "apiKey", "characterID"], 6 * HOUR),
    ("/corp/StarbaseDetail.xml.aspx", &["userID", "apiKey", "characterID", "itemID", "version"], HOUR),
    ("/corp/StarbaseList.xml.aspx", &["userID", "apiKey", "characterID", "version"], 6 * HOUR),
    ("/corp/Shareholders.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/Standings.xml.aspx", &["userID", "apiKey", "characterID"], 3 * HOUR),
    ("/corp/Titles.xml.aspx", &["userID", "apiKey", "characterID"], HOUR),
    ("/corp/WalletJournal.xml.aspx", &["userID", "apiKey", "characterID", "accountKey", "beforeRefID"], HOUR),
    ("/corp/WalletTransactions.xml.aspx", &["userID", "apiKey", "characterID", "accountKey", "beforeTransID"], HOUR),
    ("/eve/AllianceList.xml.aspx", &[], HOUR),
    ("/eve/CertificateTree.xml.aspx", &[], 23 * HOUR),
    ("/eve/ConquerableStationList.xml.aspx", &[], HOUR),
    ("/eve/ErrorList.xml.aspx", &[], HOUR),
    ("/eve/FacWarStats.xml.aspx", &[], HOUR),
    ("/eve/FacWarTopStats.xml.aspx", &[], HOUR),
    ("/eve/CharacterID.xml.aspx", &["names"], 24 * HOUR),
    ("/eve/CharacterName.xml.aspx", &["ids"], 24 * HOUR),
    ("/eve/RefTypes.xml.aspx", &[], 24 * HOUR),
    ("/eve/SkillTree.xml.aspx", &[], 24 * HOUR),
    ("/map/FacWarSystems.xml.aspx", &[], HOUR),
    ("/map/Jumps.xml.aspx", &[], HOUR),
    ("/map/Kills.xml.aspx", &[], HOUR),
    ("/map/Sovereignty.xml.aspx", &[], HOUR),
    ("/server/ServerStatus.xml.aspx", &[], 3 * MINUTE),
];

/// Default upstream root the preset endpoints are served from.
pub const DEFAULT_UPSTREAM_ROOT: &str = "http://api.eve-online.com";

/// Materialise the built-in endpoint table.
pub fn eve_api() -> Vec<EndpointDescriptor> {
    EVE_API
        .iter()
        .map(|(path, parameters, ttl_secs)| {
            EndpointDescriptor::new(*path, parameters, Duration::from_secs(*ttl_secs))
        })
        .collect()
}
