//! Built-in base-game data set.
//!
//! The default catalog describes the unmodded game: eleven regions from the
//! surface shallows down to the thermal vents, the locked passages between
//! them, and roughly seventy entities across every category. It is used by
//! the CLI when no external data is supplied and by tests as realistic
//! fixture data.
//!
//! The progression forms a ladder: shallows gear opens the kelp forest and
//! the wrecks, fins open the plateau, the oxygen tank opens the mushroom
//! grove, the pod sub and dive light open the jelly caves, and the tide
//! runner with its depth modules opens everything below the grand ravine.
//! Every prerequisite chain is a DAG and every region is reachable without
//! priority fill.

use tidelock_types::{
    Entity, ItemCategory, ItemId, Lock, Region, RegionId, Transition,
};

/// A complete data set: entities, regions, transitions, starting region.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Every randomizable entity.
    pub entities: Vec<Entity>,
    /// Every region of the world.
    pub regions: Vec<Region>,
    /// Directed transitions between regions. Return paths never gate
    /// progression, so only the forward direction is modeled.
    pub transitions: Vec<Transition>,
    /// Where sphere 0 begins.
    pub start: RegionId,
}

// ---------------------------------------------------------------------------
// Entity builder helpers
// ---------------------------------------------------------------------------

/// A harvestable raw material.
fn raw(id: &str, value: u32, depth: u32) -> Entity {
    Entity {
        id: ItemId::from(id),
        category: ItemCategory::RawMaterial,
        value,
        accessible_depth: depth,
        unit_size: 1,
        dependencies: Vec::new(),
        prerequisites: Vec::new(),
        max_uses_per_game: 0,
        craftable: false,
    }
}

/// A non-craftable world pickup (egg, seed, fish, fragment, databox).
fn pickup(id: &str, category: ItemCategory, value: u32, depth: u32) -> Entity {
    Entity {
        id: ItemId::from(id),
        category,
        value,
        accessible_depth: depth,
        unit_size: 1,
        dependencies: Vec::new(),
        prerequisites: Vec::new(),
        max_uses_per_game: 0,
        craftable: false,
    }
}

/// A craftable entity with its vanilla ingredient dependencies.
fn crafted(
    id: &str,
    category: ItemCategory,
    value: u32,
    unit_size: u32,
    dependencies: &[&str],
) -> Entity {
    Entity {
        id: ItemId::from(id),
        category,
        value,
        accessible_depth: 0,
        unit_size,
        dependencies: dependencies.iter().map(|d| ItemId::from(*d)).collect(),
        prerequisites: Vec::new(),
        max_uses_per_game: 0,
        craftable: true,
    }
}

/// Attach blueprint prerequisites to an entity.
fn unlocked_by(mut entity: Entity, prerequisites: &[&str]) -> Entity {
    entity.prerequisites = prerequisites.iter().map(|p| ItemId::from(*p)).collect();
    entity
}

/// Cap an entity's total uses as an ingredient across one game.
fn bounded(mut entity: Entity, max_uses: u32) -> Entity {
    entity.max_uses_per_game = max_uses;
    entity
}

// ---------------------------------------------------------------------------
// Entities by group
// ---------------------------------------------------------------------------

/// Harvestable raw materials, shallow to deep.
fn raw_materials() -> Vec<Entity> {
    vec![
        raw("salvage_metal", 4, 5),
        raw("quartz", 3, 5),
        raw("salt_crystal", 2, 5),
        raw("table_coral", 3, 5),
        raw("copper_ore", 5, 25),
        raw("vine_cluster", 2, 25),
        raw("acid_fungus", 4, 25),
        raw("basalt_chunk", 3, 0),
        raw("silver_ore", 12, 70),
        raw("lead_ore", 8, 70),
        raw("gold_ore", 18, 130),
        raw("magnetite", 14, 190),
        raw("lithium_ore", 16, 300),
        raw("diamond_stone", 30, 300),
        bounded(raw("ruby_shard", 24, 460), 8),
        raw("gel_pod", 15, 620),
        bounded(raw("ion_crystal", 28, 620), 6),
        raw("sulfur_pod", 10, 900),
        raw("spire_crystal", 26, 900),
    ]
}

/// One-step crafted materials.
fn basic_materials() -> Vec<Entity> {
    vec![
        crafted("iron_ingot", ItemCategory::BasicMaterial, 10, 1, &["salvage_metal"]),
        crafted("fiber_mesh", ItemCategory::BasicMaterial, 6, 1, &["vine_cluster"]),
        crafted("glass_pane", ItemCategory::BasicMaterial, 8, 1, &["quartz"]),
        crafted("copper_wire", ItemCategory::BasicMaterial, 12, 1, &["copper_ore"]),
        crafted(
            "battery_cell",
            ItemCategory::BasicMaterial,
            18,
            2,
            &["copper_ore", "acid_fungus"],
        ),
        crafted("bleach", ItemCategory::BasicMaterial, 5, 1, &["salt_crystal"]),
        crafted("lubricant", ItemCategory::BasicMaterial, 7, 1, &["acid_fungus"]),
    ]
}

/// Multi-step crafted materials.
fn advanced_materials() -> Vec<Entity> {
    vec![
        crafted(
            "steel_ingot",
            ItemCategory::AdvancedMaterial,
            30,
            1,
            &["iron_ingot", "gold_ore"],
        ),
        crafted(
            "plasteel_ingot",
            ItemCategory::AdvancedMaterial,
            48,
            1,
            &["steel_ingot", "lithium_ore"],
        ),
        crafted(
            "power_core",
            ItemCategory::AdvancedMaterial,
            40,
            2,
            &["battery_cell", "silver_ore"],
        ),
        crafted(
            "circuit_mesh",
            ItemCategory::AdvancedMaterial,
            36,
            1,
            &["copper_wire", "gold_ore"],
        ),
        crafted(
            "aerogel",
            ItemCategory::AdvancedMaterial,
            45,
            1,
            &["gel_pod", "ruby_shard"],
        ),
    ]
}

/// Handheld tools and wearable equipment.
fn gear() -> Vec<Entity> {
    vec![
        // Tools
        crafted(
            "survival_knife",
            ItemCategory::Tool,
            25,
            2,
            &["iron_ingot", "fiber_mesh"],
        ),
        crafted(
            "field_scanner",
            ItemCategory::Tool,
            35,
            2,
            &["battery_cell", "copper_wire"],
        ),
        crafted(
            "dive_light",
            ItemCategory::Tool,
            30,
            2,
            &["battery_cell", "glass_pane"],
        ),
        crafted(
            "repair_wand",
            ItemCategory::Tool,
            28,
            2,
            &["iron_ingot", "bleach"],
        ),
        crafted(
            "laser_cutter",
            ItemCategory::Tool,
            55,
            2,
            &["diamond_stone", "battery_cell"],
        ),
        crafted(
            "beacon_marker",
            ItemCategory::Tool,
            20,
            1,
            &["copper_wire", "salt_crystal"],
        ),
        crafted(
            "habitat_wand",
            ItemCategory::Tool,
            40,
            2,
            &["battery_cell", "fiber_mesh"],
        ),
        // Equipment
        crafted(
            "standard_fins",
            ItemCategory::Equipment,
            15,
            2,
            &["fiber_mesh"],
        ),
        unlocked_by(
            crafted(
                "swift_fins",
                ItemCategory::Equipment,
                35,
                2,
                &["fiber_mesh", "lubricant"],
            ),
            &["standard_fins"],
        ),
        crafted(
            "oxygen_tank",
            ItemCategory::Equipment,
            25,
            3,
            &["iron_ingot", "glass_pane"],
        ),
        unlocked_by(
            crafted(
                "extended_tank",
                ItemCategory::Equipment,
                45,
                3,
                &["glass_pane", "silver_ore"],
            ),
            &["oxygen_tank"],
        ),
        unlocked_by(
            crafted(
                "pressure_suit",
                ItemCategory::Equipment,
                60,
                3,
                &["fiber_mesh", "lead_ore"],
            ),
            &["databox_pressure_suit"],
        ),
        unlocked_by(
            crafted(
                "rebreather_unit",
                ItemCategory::Equipment,
                50,
                2,
                &["fiber_mesh", "copper_wire"],
            ),
            &["databox_rebreather"],
        ),
    ]
}

/// Vehicles and their upgrade modules.
fn mobility() -> Vec<Entity> {
    vec![
        crafted(
            "glide_skiff",
            ItemCategory::Vehicle,
            60,
            4,
            &["battery_cell", "lubricant", "iron_ingot"],
        ),
        unlocked_by(
            crafted(
                "pod_sub",
                ItemCategory::Vehicle,
                140,
                6,
                &["iron_ingot", "battery_cell", "lubricant"],
            ),
            &["pod_sub_fragment"],
        ),
        unlocked_by(
            crafted(
                "tide_runner",
                ItemCategory::Vehicle,
                260,
                8,
                &["plasteel_ingot", "power_core", "glass_pane"],
            ),
            &["tide_runner_fragment"],
        ),
        unlocked_by(
            crafted(
                "tide_runner_depth_mk1",
                ItemCategory::VehicleUpgrade,
                90,
                1,
                &["steel_ingot", "ruby_shard"],
            ),
            &["tide_runner"],
        ),
        unlocked_by(
            crafted(
                "tide_runner_depth_mk2",
                ItemCategory::VehicleUpgrade,
                150,
                1,
                &["plasteel_ingot", "ion_crystal"],
            ),
            &["tide_runner_depth_mk1"],
        ),
        crafted(
            "workbench_matrix",
            ItemCategory::WorkbenchUpgrade,
            80,
            1,
            &["circuit_mesh", "magnetite"],
        ),
    ]
}

/// Base pieces and interior utilities (all gated on the habitat wand).
fn construction() -> Vec<Entity> {
    vec![
        unlocked_by(
            crafted("base_corridor", ItemCategory::BasePiece, 30, 4, &["iron_ingot"]),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted("base_room", ItemCategory::BasePiece, 50, 6, &["iron_ingot"]),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted("base_hatch", ItemCategory::BasePiece, 20, 2, &["iron_ingot"]),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "base_window",
                ItemCategory::BasePiece,
                25,
                2,
                &["glass_pane"],
            ),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "base_foundation",
                ItemCategory::BasePiece,
                35,
                4,
                &["iron_ingot"],
            ),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "storage_locker",
                ItemCategory::BaseUtility,
                20,
                2,
                &["quartz"],
            ),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "wall_planter",
                ItemCategory::BaseUtility,
                25,
                2,
                &["fiber_mesh", "table_coral"],
            ),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "power_charger",
                ItemCategory::BaseUtility,
                45,
                3,
                &["power_core", "copper_wire"],
            ),
            &["habitat_wand"],
        ),
        unlocked_by(
            crafted(
                "hatchery_unit",
                ItemCategory::BaseUtility,
                55,
                3,
                &["glass_pane", "magnetite"],
            ),
            &["habitat_wand"],
        ),
    ]
}

/// Eggs, seeds, and fish.
fn wildlife() -> Vec<Entity> {
    vec![
        pickup("reefray_egg", ItemCategory::Egg, 14, 25),
        pickup("lampfish_egg", ItemCategory::Egg, 22, 190),
        pickup("kelp_seed", ItemCategory::Seed, 4, 25),
        pickup("fungus_seed", ItemCategory::Seed, 8, 130),
        pickup("wind_fruit_seed", ItemCategory::Seed, 6, 0),
        pickup("ghostweed_seed", ItemCategory::Seed, 12, 460),
        pickup("silverdart", ItemCategory::Fish, 3, 5),
        pickup("bloomfish", ItemCategory::Fish, 4, 5),
    ]
}

/// Blueprint-granting fragments and databoxes.
fn progression_pickups() -> Vec<Entity> {
    vec![
        pickup("pod_sub_fragment", ItemCategory::Fragment, 20, 50),
        pickup("tide_runner_fragment", ItemCategory::Fragment, 30, 300),
        pickup("databox_pressure_suit", ItemCategory::Databox, 10, 70),
        pickup("databox_rebreather", ItemCategory::Databox, 10, 460),
    ]
}

// ---------------------------------------------------------------------------
// Regions and transitions
// ---------------------------------------------------------------------------

/// Build a region from its id, depth, and contained entities.
fn region(id: &str, depth: u32, entities: &[&str]) -> Region {
    Region {
        id: RegionId::from(id),
        depth,
        entities: entities.iter().map(|e| ItemId::from(*e)).collect(),
    }
}

/// The eleven world regions.
fn regions() -> Vec<Region> {
    vec![
        region(
            "surface_shallows",
            8,
            &[
                "salvage_metal",
                "quartz",
                "salt_crystal",
                "table_coral",
                "silverdart",
                "bloomfish",
            ],
        ),
        region(
            "kelp_forest",
            30,
            &[
                "copper_ore",
                "vine_cluster",
                "acid_fungus",
                "kelp_seed",
                "reefray_egg",
            ],
        ),
        region("sunken_wrecks", 60, &["pod_sub_fragment"]),
        region(
            "grassy_plateau",
            75,
            &["silver_ore", "lead_ore", "databox_pressure_suit"],
        ),
        region("mushroom_grove", 140, &["gold_ore", "fungus_seed"]),
        region("jelly_caves", 200, &["magnetite", "lampfish_egg"]),
        region(
            "grand_ravine",
            320,
            &["lithium_ore", "diamond_stone", "tide_runner_fragment"],
        ),
        region(
            "ghost_river",
            480,
            &["ruby_shard", "ghostweed_seed", "databox_rebreather"],
        ),
        region("brine_pools", 650, &["gel_pod", "ion_crystal"]),
        region("thermal_vents", 950, &["sulfur_pod", "spire_crystal"]),
        region("floating_islet", 0, &["wind_fruit_seed", "basalt_chunk"]),
    ]
}

/// The locked passages of the progression ladder.
fn transitions() -> Vec<Transition> {
    vec![
        Transition::open("surface_shallows", "kelp_forest"),
        Transition::locked(
            "surface_shallows",
            "sunken_wrecks",
            vec![Lock::RequiresItem(ItemId::from("repair_wand"))],
        ),
        Transition::locked(
            "surface_shallows",
            "floating_islet",
            vec![Lock::RequiresAnyOf(vec![
                ItemId::from("glide_skiff"),
                ItemId::from("pod_sub"),
            ])],
        ),
        Transition::locked(
            "kelp_forest",
            "grassy_plateau",
            vec![Lock::RequiresItem(ItemId::from("standard_fins"))],
        ),
        Transition::locked(
            "grassy_plateau",
            "mushroom_grove",
            vec![
                Lock::RequiresItem(ItemId::from("oxygen_tank")),
                Lock::RequiresDepth(70),
            ],
        ),
        Transition::locked(
            "mushroom_grove",
            "jelly_caves",
            vec![
                Lock::RequiresItem(ItemId::from("dive_light")),
                Lock::RequiresItem(ItemId::from("pod_sub")),
            ],
        ),
        Transition::locked(
            "jelly_caves",
            "grand_ravine",
            vec![
                Lock::RequiresAnyOf(vec![
                    ItemId::from("pressure_suit"),
                    ItemId::from("tide_runner"),
                ]),
                Lock::RequiresDepth(180),
            ],
        ),
        Transition::locked(
            "grand_ravine",
            "ghost_river",
            vec![
                Lock::RequiresItem(ItemId::from("tide_runner")),
                Lock::RequiresDepth(300),
            ],
        ),
        Transition::locked(
            "ghost_river",
            "brine_pools",
            vec![
                Lock::RequiresItem(ItemId::from("tide_runner_depth_mk1")),
                Lock::RequiresDepth(450),
            ],
        ),
        Transition::locked(
            "brine_pools",
            "thermal_vents",
            vec![
                Lock::RequiresItem(ItemId::from("tide_runner_depth_mk2")),
                Lock::RequiresDepth(600),
            ],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Public builder
// ---------------------------------------------------------------------------

/// Build the complete base-game catalog.
pub fn default_catalog() -> Catalog {
    let mut entities = Vec::with_capacity(96);
    entities.extend(raw_materials());
    entities.extend(basic_materials());
    entities.extend(advanced_materials());
    entities.extend(gear());
    entities.extend(mobility());
    entities.extend(construction());
    entities.extend(wildlife());
    entities.extend(progression_pickups());

    Catalog {
        entities,
        regions: regions(),
        transitions: transitions(),
        start: RegionId::from("surface_shallows"),
    }
}
