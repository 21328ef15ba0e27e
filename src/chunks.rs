use crate::model::{FlowChunk, UNGROUPED_CHUNK_ID};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// The implicit chunk every document has, whether authored or not.
pub fn ungrouped_chunk() -> FlowChunk {
    FlowChunk {
        id: UNGROUPED_CHUNK_ID.to_string(),
        title: "Ungrouped".to_string(),
        order: 0,
        color: None,
        collapsed_by_default: None,
        meta: None,
    }
}

/// Collaborator that turns the authored chunk list into the final,
/// de-duplicated, order-stable set. Guaranteed to include the ungrouped
/// sentinel.
pub trait ChunkProvider {
    fn normalize(&self, candidates: Vec<FlowChunk>) -> Vec<FlowChunk>;
}

/// Default provider: merges optional seeded presets with the authored list
/// (authored fields win), appends unknown chunks sorted by (order, title),
/// pins the ungrouped sentinel first and rewrites `order` to the final
/// index. The library ships no presets; hosts seed their own.
#[derive(Debug, Clone, Default)]
pub struct CanonicalChunks {
    presets: Vec<FlowChunk>,
}

impl CanonicalChunks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<FlowChunk>) -> Self {
        CanonicalChunks { presets }
    }
}

impl ChunkProvider for CanonicalChunks {
    fn normalize(&self, candidates: Vec<FlowChunk>) -> Vec<FlowChunk> {
        let mut existing: IndexMap<String, FlowChunk> = IndexMap::new();
        for chunk in candidates {
            let id = chunk.id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            existing.insert(id, chunk);
        }

        let mut merged: Vec<FlowChunk> = Vec::with_capacity(existing.len() + self.presets.len());
        for preset in &self.presets {
            match existing.shift_remove(preset.id.trim()) {
                None => merged.push(preset.clone()),
                Some(authored) => merged.push(FlowChunk {
                    id: preset.id.clone(),
                    title: if authored.title.trim().is_empty() {
                        preset.title.clone()
                    } else {
                        authored.title
                    },
                    order: authored.order,
                    color: authored.color.or_else(|| preset.color.clone()),
                    collapsed_by_default: authored
                        .collapsed_by_default
                        .or(preset.collapsed_by_default),
                    meta: authored.meta.or_else(|| preset.meta.clone()),
                }),
            }
        }

        let mut extras: Vec<FlowChunk> = existing.into_values().collect();
        extras.sort_by(|a, b| match a.order.cmp(&b.order) {
            Ordering::Equal => a.title.cmp(&b.title),
            other => other,
        });
        merged.extend(extras);

        let mut seen = IndexMap::new();
        for mut chunk in merged {
            chunk.id = chunk.id.trim().to_string();
            if chunk.title.trim().is_empty() {
                chunk.title = "Chunk".to_string();
            } else {
                chunk.title = chunk.title.trim().to_string();
            }
            seen.entry(chunk.id.clone()).or_insert(chunk);
        }
        let mut sanitized: Vec<FlowChunk> = seen.into_values().collect();

        if !sanitized.iter().any(|c| c.id == UNGROUPED_CHUNK_ID) {
            sanitized.push(ungrouped_chunk());
        }

        sanitized.sort_by(|a, b| {
            if a.id == UNGROUPED_CHUNK_ID {
                return Ordering::Less;
            }
            if b.id == UNGROUPED_CHUNK_ID {
                return Ordering::Greater;
            }
            match a.order.cmp(&b.order) {
                Ordering::Equal => a.title.cmp(&b.title),
                other => other,
            }
        });
        for (index, chunk) in sanitized.iter_mut().enumerate() {
            chunk.order = index as i64;
        }
        sanitized
    }
}
