use crate::entities::character::CharacterId;
use crate::entities::equipment::{EquipPosition, Variant};
use crate::entities::inventory::{Category, CATEGORIES};
use crate::entities::item::{Slot, TemplateId};
use crate::inventory::error::InventoryError;
use crate::inventory::service::InventoryService;
use crate::inventory::stacking::Adjustment;
use crate::world::movement::{ElementKind, Movement, PathElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        character: CharacterId,
        category: Category,
        template: TemplateId,
        quantity: u32,
    },
    Equip {
        character: CharacterId,
        source: Slot,
        proposed: Option<Slot>,
    },
    Unequip {
        character: CharacterId,
        source: Slot,
    },
    Move {
        character: CharacterId,
        movement: Movement,
    },
    Swap {
        character: CharacterId,
        category: Category,
        from: Slot,
        to: Slot,
    },
    Drop {
        character: CharacterId,
        category: Category,
        slot: Slot,
        quantity: u32,
    },
    Map {
        character: CharacterId,
        map: u32,
        portal: u32,
    },
    Show {
        character: CharacterId,
    },
    Delete {
        character: CharacterId,
    },
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut parts = trimmed.split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| "command missing name".to_string())?
        .to_ascii_lowercase();
    let character = CharacterId(parse_u32(parts.next(), "character")?);
    let parsed = match name.as_str() {
        "create" => Command::Create {
            character,
            category: parse_category(parts.next())?,
            template: TemplateId(parse_u32(parts.next(), "template")?),
            quantity: parse_optional_u32(parts.next(), 1)?,
        },
        "equip" => Command::Equip {
            character,
            source: parse_slot(parts.next())?,
            proposed: parts.next().map(|value| parse_slot(Some(value))).transpose()?,
        },
        "unequip" => Command::Unequip {
            character,
            source: parse_slot(parts.next())?,
        },
        "move" => {
            let start_x = parse_i16(parts.next(), "x")?;
            let start_y = parse_i16(parts.next(), "y")?;
            let elements = parts.by_ref().map(parse_element).collect::<Result<Vec<_>, _>>()?;
            Command::Move {
                character,
                movement: Movement {
                    start_x,
                    start_y,
                    elements,
                },
            }
        }
        "swap" => Command::Swap {
            character,
            category: parse_category(parts.next())?,
            from: parse_slot(parts.next())?,
            to: parse_slot(parts.next())?,
        },
        "drop" => Command::Drop {
            character,
            category: parse_category(parts.next())?,
            slot: parse_slot(parts.next())?,
            quantity: parse_optional_u32(parts.next(), 0)?,
        },
        "map" => Command::Map {
            character,
            map: parse_u32(parts.next(), "map")?,
            portal: parse_u32(parts.next(), "portal")?,
        },
        "show" => Command::Show { character },
        "delete" => Command::Delete { character },
        other => return Err(format!("unknown command '{other}'")),
    };
    if let Some(extra) = parts.next() {
        return Err(format!("{name}: unexpected argument '{extra}'"));
    }
    Ok(Some(parsed))
}

fn parse_u32(value: Option<&str>, what: &str) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("command missing {what}"))?;
    value
        .parse::<u32>()
        .map_err(|_| format!("{what}: expected u32, got '{value}'"))
}

fn parse_optional_u32(value: Option<&str>, default: u32) -> Result<u32, String> {
    match value {
        Some(_) => parse_u32(value, "quantity"),
        None => Ok(default),
    }
}

fn parse_i16(value: Option<&str>, what: &str) -> Result<i16, String> {
    let value = value.ok_or_else(|| format!("command missing {what}"))?;
    value
        .parse::<i16>()
        .map_err(|_| format!("{what}: expected i16, got '{value}'"))
}

fn parse_category(value: Option<&str>) -> Result<Category, String> {
    let value = value.ok_or_else(|| "command missing category".to_string())?;
    Category::from_name(value).ok_or_else(|| format!("unknown category '{value}'"))
}

/// `3` is inventory slot 3, `weapon` the normal board position and
/// `cash:weapon` its cash counterpart. A negative number is a raw slot.
fn parse_slot(value: Option<&str>) -> Result<Slot, String> {
    let value = value.ok_or_else(|| "command missing slot".to_string())?;
    if let Ok(raw) = value.parse::<i16>() {
        return Slot::from_raw(raw).ok_or_else(|| format!("invalid slot {raw}"));
    }
    let (variant, name) = match value.split_once(':') {
        Some((prefix, name)) if prefix.eq_ignore_ascii_case("cash") => (Variant::Cash, name),
        _ => (Variant::Normal, value),
    };
    EquipPosition::from_name(name)
        .map(|position| Slot::equipped(position, variant))
        .ok_or_else(|| format!("unknown equip position '{value}'"))
}

/// `kind:x:y:stance`, e.g. `normal:120:-40:4`.
fn parse_element(value: &str) -> Result<PathElement, String> {
    let fields: Vec<&str> = value.split(':').collect();
    let [kind, x, y, stance] = fields.as_slice() else {
        return Err(format!("path element '{value}' is not kind:x:y:stance"));
    };
    let kind =
        ElementKind::from_name(kind).ok_or_else(|| format!("unknown element kind '{kind}'"))?;
    let stance = stance
        .parse::<u8>()
        .map_err(|_| format!("stance: expected u8, got '{stance}'"))?;
    Ok(PathElement {
        kind,
        x: parse_i16(Some(*x), "x")?,
        y: parse_i16(Some(*y), "y")?,
        stance,
    })
}

/// Runs a parsed command and renders its one-line result.
pub fn execute(service: &InventoryService, command: &Command) -> Result<String, InventoryError> {
    match command {
        Command::Create {
            character,
            category,
            template,
            quantity,
        } => {
            let adjustments = service.create_item(*character, *category, *template, *quantity)?;
            let steps: Vec<String> = adjustments
                .iter()
                .map(|adjustment| match adjustment {
                    Adjustment::Create { slot, quantity, .. } => format!("+{quantity}@{slot}"),
                    Adjustment::Update {
                        slot, changed, total, ..
                    } => format!("+{changed}@{slot}={total}"),
                })
                .collect();
            Ok(format!("create {character}: {}", steps.join(" ")))
        }
        Command::Equip {
            character,
            source,
            proposed,
        } => match service.equip(*character, *source, *proposed)? {
            Some(outcome) => {
                let mut line = format!("equip {character}: {} -> {}", outcome.from, outcome.to);
                for displaced in &outcome.unequipped {
                    line.push_str(&format!(
                        ", unequipped {} {} -> {}",
                        displaced.item.template, displaced.from, displaced.to
                    ));
                }
                Ok(line)
            }
            None => Ok(format!("equip {character}: already at {source}")),
        },
        Command::Unequip { character, source } => {
            let displacement = service.unequip(*character, *source)?;
            Ok(format!(
                "unequip {character}: {} -> {}",
                displacement.from, displacement.to
            ))
        }
        Command::Move {
            character,
            movement,
        } => {
            let position = service.apply_movement(*character, movement);
            Ok(format!(
                "move {character}: ({}, {}) stance {}",
                position.x, position.y, position.stance
            ))
        }
        Command::Swap {
            character,
            category,
            from,
            to,
        } => {
            let moved = service.move_item(*character, *category, *from, *to)?;
            Ok(format!("swap {character}: {from} -> {to}, {} moved", moved.len()))
        }
        Command::Drop {
            character,
            category,
            slot,
            quantity,
        } => {
            let removal = service.remove_item(*character, *category, *slot, *quantity)?;
            Ok(format!(
                "drop {character}: -{} @{slot}, {} left",
                removal.removed, removal.remaining
            ))
        }
        Command::Map {
            character,
            map,
            portal,
        } => {
            let position = service.change_map(*character, *map, *portal)?;
            Ok(format!(
                "map {character}: {map} portal {portal} at ({}, {})",
                position.x, position.y
            ))
        }
        Command::Show { character } => {
            let snapshot = service.snapshot(*character)?;
            let counts: Vec<String> = CATEGORIES
                .iter()
                .map(|category| {
                    let container = snapshot.aggregate.container(*category);
                    format!("{category}={}/{}", container.occupied(), container.capacity)
                })
                .collect();
            Ok(format!(
                "show {character}: {} equipped={} at ({}, {}) stance {}",
                counts.join(" "),
                snapshot.board.equipped_count(),
                snapshot.position.x,
                snapshot.position.y,
                snapshot.position.stance
            ))
        }
        Command::Delete { character } => {
            let removed = service.delete_character_state(*character)?;
            Ok(format!("delete {character}: {removed} items removed"))
        }
    }
}
