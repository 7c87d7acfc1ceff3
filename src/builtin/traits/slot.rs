//! `core/v1/slot`: declares a component's position in a parent's slot.
//!
//! Structural only. The slot index consumes the `container` shape during
//! tree assembly; the behavior here never runs in the pipeline (the runner
//! skips it) and exists so the trait is registered, schema-checked in
//! editors, and listed in palettes.

use crate::pipeline::{BehaviorError, Ctx, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};
use crate::slots::{SLOT_TRAIT_NAME, SLOT_TRAIT_VERSION};

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(SLOT_TRAIT_VERSION, SLOT_TRAIT_NAME),
            "places the component into a parent slot",
        ),
        Schema::object([Field::required(
            "container",
            Schema::object([
                Field::required("id", Schema::String),
                Field::required("slot", Schema::String),
            ]),
        )]),
        |_: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> { Ok(TraitResult::inert()) },
    )
}
