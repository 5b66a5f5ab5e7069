//! Administrative command processing
//!
//! [`ConfigCommandProcessor`] turns a tokenized `/rt` command line into
//! policy store mutations and returns the reply lines for the operator.
//! Every failure is recovered here and reported as a single error line.

pub mod help;
pub mod property;

use std::sync::Arc;

use chrono::Utc;
use regiontrigger_core::{BanKind, Event, EventSet, RegionPolicy};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::Limits;
use crate::error::PolicyError;
use crate::host::{ItemResolver, MessageKind, SpatialIndex};
use crate::observability::{EngineEvent, EventEmitter};
use crate::store::{Ban, RegionConfigStore};

pub use property::Property;

const SET_USAGE: &str = "Invalid syntax! Proper syntax: /rt set-<prop> <region> [--del] <value>";

/// One line of command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyLine {
    /// Presentation
    pub kind: MessageKind,
    /// Text
    pub text: String,
}

impl ReplyLine {
    /// A confirmation line.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    /// An informational line.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    /// A warning line.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
        }
    }

    /// An error line.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

/// Parses and applies `/rt` commands.
pub struct ConfigCommandProcessor {
    store: Arc<RegionConfigStore>,
    index: Arc<dyn SpatialIndex>,
    items: Arc<dyn ItemResolver>,
    limits: Limits,
    page_size: usize,
    events: Arc<EventEmitter>,
}

impl ConfigCommandProcessor {
    /// Creates a processor over `store`.
    #[must_use]
    pub fn new(
        store: Arc<RegionConfigStore>,
        index: Arc<dyn SpatialIndex>,
        items: Arc<dyn ItemResolver>,
        limits: Limits,
        page_size: usize,
        events: Arc<EventEmitter>,
    ) -> Self {
        Self {
            store,
            index,
            items,
            limits,
            page_size,
            events,
        }
    }

    /// Splits `line` shell-style and executes it.
    #[must_use]
    pub fn execute_line(&self, line: &str) -> Vec<ReplyLine> {
        match shlex::split(line) {
            Some(tokens) => self.execute(&tokens),
            None => vec![ReplyLine::error("Invalid syntax! Unbalanced quotes.")],
        }
    }

    /// Executes one tokenized command.
    #[must_use]
    pub fn execute(&self, tokens: &[String]) -> Vec<ReplyLine> {
        debug!(?tokens, "executing region command");
        match self.dispatch(tokens) {
            Ok(lines) => lines,
            Err(e) => {
                if let PolicyError::Persistence(inner) = &e {
                    error!(error = %inner, "region command failed to persist");
                }
                vec![ReplyLine::error(e.to_string())]
            }
        }
    }

    fn dispatch(&self, tokens: &[String]) -> Result<Vec<ReplyLine>, PolicyError> {
        let Some(first) = tokens.first() else {
            return Err(PolicyError::Syntax(
                "Invalid syntax! Type /rt --help to get instructions.".to_string(),
            ));
        };
        let command = first.trim().to_ascii_lowercase();

        if let Some(alias) = command.strip_prefix("set-") {
            return self.set(alias, tokens);
        }
        match command.as_str() {
            "show" => self.show(tokens),
            "reload" => self.reload(),
            "--help" => {
                let page = help::parse_page(tokens.get(1).map(String::as_str))?;
                help::paginate(&help::help_lines(), page, self.page_size)
            }
            _ => Err(PolicyError::Syntax(
                "Invalid syntax! Type /rt --help for instructions.".to_string(),
            )),
        }
    }

    fn set(&self, alias: &str, tokens: &[String]) -> Result<Vec<ReplyLine>, PolicyError> {
        if tokens.len() < 3 {
            return Err(PolicyError::Syntax(SET_USAGE.to_string()));
        }
        let property =
            Property::from_alias(alias).ok_or_else(|| PolicyError::UnknownProperty(alias.to_string()))?;
        let region = self
            .index
            .region(&tokens[1])
            .ok_or_else(|| PolicyError::RegionNotFound(tokens[1].clone()))?
            .name;

        self.store.get_or_create(&region)?;

        let delete = tokens[2].eq_ignore_ascii_case("--del");
        if delete && tokens.len() == 3 && !property.allows_bare_delete() {
            return Err(PolicyError::Syntax(format!(
                "Invalid syntax! Proper syntax: /rt set-{} <region> [--del] <value>",
                property.short()
            )));
        }
        let value = if delete && tokens.len() == 3 {
            None
        } else {
            let start = if delete { 3 } else { 2 };
            Some(tokens[start..].join(" "))
        };

        let request = SetRequest {
            region: &region,
            property,
            delete,
            value,
        };
        let lines = self.apply(&request)?;
        self.events.emit(EngineEvent::PolicyChanged {
            timestamp: Utc::now(),
            region: region.clone(),
            property: property.name(),
            deleted: delete,
        });
        Ok(lines)
    }

    fn apply(&self, req: &SetRequest<'_>) -> Result<Vec<ReplyLine>, PolicyError> {
        let region = req.region;
        let value = req.value.clone().unwrap_or_default();

        match req.property {
            Property::Event => self.set_events(region, &value, req.delete),
            Property::Projban => {
                let id = parse_id(&value, 1, self.limits.max_projectile_types)
                    .ok_or_else(|| invalid_id(BanKind::Projectile, &value))?;
                self.set_ban(region, &Ban::Projectile(id), req.delete, &format!("projectile {id}"))
            }
            Property::Tileban => {
                let id = parse_id(&value, 0, self.limits.max_tile_types)
                    .ok_or_else(|| invalid_id(BanKind::Tile, &value))?;
                self.set_ban(region, &Ban::Tile(id), req.delete, &format!("tile {id}"))
            }
            Property::Itemban => {
                let mut matches = self.items.find(&value);
                match matches.len() {
                    0 => Err(PolicyError::UnknownItem(value)),
                    1 => {
                        let item = matches.remove(0).name;
                        self.set_ban(region, &Ban::Item(item.clone()), req.delete, &item)
                    }
                    _ => Err(PolicyError::AmbiguousItem {
                        query: value,
                        candidates: matches.into_iter().map(|i| i.name).collect(),
                    }),
                }
            }
            Property::EnterMsg => {
                let text = req.value.clone().filter(|_| !req.delete);
                let policy = self.store.set_enter_message(region, text)?;
                Ok(message_reply(&policy, "enter message", Event::EnterMsg, req))
            }
            Property::LeaveMsg => {
                let text = req.value.clone().filter(|_| !req.delete);
                let policy = self.store.set_leave_message(region, text)?;
                Ok(message_reply(&policy, "leave message", Event::LeaveMsg, req))
            }
            Property::Message => {
                let text = req.value.clone().filter(|_| !req.delete);
                let policy = self.store.set_message(region, text)?;
                Ok(message_reply(&policy, "message", Event::Message, req))
            }
            Property::MsgInterval => {
                if req.delete {
                    return Err(PolicyError::Syntax(
                        "Invalid usage! Proper usage: /rt set-mi <region> <interval>".to_string(),
                    ));
                }
                let seconds: u32 = value
                    .trim()
                    .parse()
                    .map_err(|_| PolicyError::InvalidInterval(value.clone()))?;
                let policy = self.store.set_message_interval(region, seconds)?;
                let mut lines = vec![ReplyLine::success(format!(
                    "Set message interval of region {region} to {seconds}."
                ))];
                lines.extend(inert_warning(&policy, Event::Message));
                Ok(lines)
            }
            Property::TempGroup => {
                if req.delete || value == "null" {
                    self.store.set_temp_group(region, None)?;
                    return Ok(vec![ReplyLine::success(format!(
                        "Removed tempgroup of region {region}."
                    ))]);
                }
                let policy = self.store.set_temp_group(region, Some(value.clone()))?;
                let mut lines = vec![ReplyLine::success(format!(
                    "Set tempgroup of region {region} to {value}."
                ))];
                lines.extend(inert_warning(&policy, Event::TempGroup));
                Ok(lines)
            }
            Property::TempPerm => {
                let permissions: Vec<String> = value
                    .to_ascii_lowercase()
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if req.delete {
                    self.store.remove_permissions(region, &permissions)?;
                } else {
                    self.store.add_permissions(region, &permissions)?;
                }
                Ok(vec![ReplyLine::success(format!(
                    "Region {region} has been modified successfully."
                ))])
            }
        }
    }

    fn set_events(
        &self,
        region: &str,
        value: &str,
        delete: bool,
    ) -> Result<Vec<ReplyLine>, PolicyError> {
        let (events, invalid) = EventSet::parse_list(value);
        if events.is_empty() && invalid.is_empty() {
            return Err(PolicyError::Syntax(SET_USAGE.to_string()));
        }

        let mut lines = Vec::new();
        if !events.is_empty() {
            if delete {
                self.store.remove_events(region, events)?;
            } else {
                self.store.add_events(region, events)?;
            }
            lines.push(ReplyLine::success(format!(
                "Region {region} has been modified successfully!"
            )));
        }
        if !invalid.is_empty() {
            lines.push(ReplyLine::error(PolicyError::UnknownEvents(invalid).to_string()));
        }
        Ok(lines)
    }

    fn set_ban(
        &self,
        region: &str,
        ban: &Ban,
        delete: bool,
        label: &str,
    ) -> Result<Vec<ReplyLine>, PolicyError> {
        let text = if delete {
            self.store.remove_ban(region, ban)?;
            format!("Unbanned {label} in region {region}.")
        } else {
            self.store.add_ban(region, ban)?;
            format!("Banned {label} in region {region}.")
        };
        Ok(vec![ReplyLine::success(text)])
    }

    fn show(&self, tokens: &[String]) -> Result<Vec<ReplyLine>, PolicyError> {
        if tokens.len() != 2 {
            return Err(PolicyError::Syntax(
                "Invalid syntax! Usage: /rt show <region>".to_string(),
            ));
        }
        let region = self
            .index
            .region(&tokens[1])
            .ok_or_else(|| PolicyError::RegionNotFound(tokens[1].clone()))?
            .name;

        let Some(policy) = self.store.get(&region) else {
            return Ok(vec![ReplyLine::info(format!(
                "{region} has not been set up yet. Use: /rt set-<prop> <name> <value>"
            ))]);
        };

        Ok(describe(&policy).into_iter().map(ReplyLine::info).collect())
    }

    fn reload(&self) -> Result<Vec<ReplyLine>, PolicyError> {
        let count = self.store.reload()?;
        self.events.emit(EngineEvent::PoliciesReloaded {
            timestamp: Utc::now(),
            count,
        });
        Ok(vec![ReplyLine::success(
            "Reloaded regions from database successfully.",
        )])
    }
}

impl std::fmt::Debug for ConfigCommandProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCommandProcessor")
            .field("limits", &self.limits)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

struct SetRequest<'a> {
    region: &'a str,
    property: Property,
    delete: bool,
    value: Option<String>,
}

/// Parses a ban id in `min..max`.
fn parse_id(raw: &str, min: u16, max: u16) -> Option<u16> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|id| (min..max).contains(id))
}

fn invalid_id(kind: BanKind, value: &str) -> PolicyError {
    PolicyError::InvalidId {
        kind,
        value: value.to_string(),
    }
}

fn message_reply(
    policy: &RegionPolicy,
    label: &str,
    flag: Event,
    req: &SetRequest<'_>,
) -> Vec<ReplyLine> {
    let region = req.region;
    match req.value.as_deref().filter(|_| !req.delete) {
        Some(text) => {
            let mut lines = vec![ReplyLine::success(format!(
                "Set {label} of region {region} to '{text}'"
            ))];
            lines.extend(inert_warning(policy, flag));
            lines
        }
        None => vec![ReplyLine::success(format!(
            "Removed {label} of region {region}."
        ))],
    }
}

/// Warns when a field was set but the flag that activates it is off.
fn inert_warning(policy: &RegionPolicy, flag: Event) -> Option<ReplyLine> {
    (!policy.has_event(flag)).then(|| {
        ReplyLine::warning(format!(
            "Add event {} if you want to make it work.",
            flag.name().to_ascii_uppercase()
        ))
    })
}

/// Renders a policy for `show`.
fn describe(policy: &RegionPolicy) -> Vec<String> {
    let or_none = |list: Vec<String>| {
        if list.is_empty() {
            "None".to_string()
        } else {
            list.join(", ")
        }
    };
    let text = |value: Option<&String>| value.map_or_else(|| "None".to_string(), Clone::clone);

    vec![
        format!("*** Information of region {} ***", policy.region),
        format!(" * Events: {}", policy.events),
        format!(" * TempGroup: {}", text(policy.temp_group.as_ref())),
        format!(
            " * Message & Interval: {}({}s)",
            text(policy.message.as_ref()),
            policy.message_interval
        ),
        format!(" * EnterMessage: {}", text(policy.enter_message.as_ref())),
        format!(" * LeaveMessage: {}", text(policy.leave_message.as_ref())),
        format!(" * Itembans: {}", or_none(policy.bans(BanKind::Item))),
        format!(" * Projbans: {}", or_none(policy.bans(BanKind::Projectile))),
        format!(" * Tilebans: {}", or_none(policy.bans(BanKind::Tile))),
        format!(
            " * TempPermissions: {}",
            or_none(policy.temp_permissions.iter().cloned().collect())
        ),
    ]
}
