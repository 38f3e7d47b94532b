//! Contact detection: two interchangeable search policies maintaining the
//! per-grain neighbor lists.

use crate::core::{Grain, GrainStore};
use crate::error::{Result, SimError};
use crate::fluid::{FluidGrid, FluidLayer};

/// Signed gap between two grains: center distance minus the sum of their
/// contact radii. Negative means penetrating/contacting.
pub fn gap(a: &Grain, b: &Grain) -> f64 {
    (a.lin_pos - b.lin_pos).length() - (a.contact_radius + b.contact_radius)
}

/// Sweeps every occupied neighbor slot and resets those whose pair no
/// longer overlaps or involves a disabled grain, clearing the stored
/// tangential displacement so a re-formed contact starts with a fresh
/// spring. Disabled grains never move, so without the flag check a slot
/// established before a grain was disabled would keep feeding forces to
/// the resolver indefinitely.
pub fn remove_separated_contacts(store: &mut GrainStore) {
    for i in 0..store.len() {
        let slot_count = store.get(i).map(|g| g.contacts.len()).unwrap_or(0);
        for slot in 0..slot_count {
            let Some(j) = store.get(i).and_then(|g| g.contacts[slot]) else {
                continue;
            };
            let stale = {
                let (gi, gj) = (store.get(i), store.get(j));
                match (gi, gj) {
                    (Some(gi), Some(gj)) => !gi.enabled || !gj.enabled || gap(gi, gj) > 0.0,
                    _ => true,
                }
            };
            if stale {
                if let Some(grain) = store.get_mut(i) {
                    grain.clear_contact_slot(slot);
                }
            }
        }
    }
}

/// Tests a candidate pair for overlap and registers it in the neighbor
/// list of the lower-indexed grain, which owns the contact record.
///
/// Already-registered pairs and non-overlapping pairs are left untouched.
/// A new contact with no empty slot available is fatal: losing a contact
/// silently would desynchronize the spring history.
pub fn check_and_add_contact(store: &mut GrainStore, a: usize, b: usize) -> Result<()> {
    if a == b {
        return Ok(());
    }
    let (i, j) = if a < b { (a, b) } else { (b, a) };

    {
        let (Some(gi), Some(gj)) = (store.get(i), store.get(j)) else {
            return Ok(());
        };
        if !gi.enabled || !gj.enabled {
            return Ok(());
        }
        if gap(gi, gj) > 0.0 {
            return Ok(());
        }
        if gi.find_contact_slot(j).is_some() {
            return Ok(());
        }
    }

    let Some(grain) = store.get_mut(i) else {
        return Ok(());
    };
    match grain.contacts.iter().position(|slot| slot.is_none()) {
        Some(slot) => {
            grain.contacts[slot] = Some(j);
            grain.contact_displacement[slot] = glam::DVec2::ZERO;
            Ok(())
        }
        None => Err(SimError::ContactCapacityExceeded {
            grain: i,
            nc_max: grain.contacts.len(),
        }),
    }
}

/// All-pairs search: overlap test for every unordered pair. O(n²), used
/// when no fluid grid is configured to accelerate the lookup.
pub fn find_contacts_all_pairs(store: &mut GrainStore) -> Result<()> {
    remove_separated_contacts(store);
    for i in 0..store.len() {
        for j in (i + 1)..store.len() {
            check_and_add_contact(store, i, j)?;
        }
    }
    Ok(())
}

/// Grid-accelerated search: each grain is tested only against grains in
/// its own cell and the adjacent cells permitted by the grid's boundary
/// conditions. Requires [`FluidGrid::sort_grains`] to have run this step;
/// produces the same active-contact set as the all-pairs policy.
pub fn find_contacts_in_grid(
    store: &mut GrainStore,
    grid: &FluidGrid,
    layer: FluidLayer,
) -> Result<()> {
    remove_separated_contacts(store);
    for i in 0..store.len() {
        let cell = match (store.get(i), layer) {
            (Some(grain), _) if !grain.enabled => continue,
            (Some(grain), FluidLayer::Ocean) => grain.ocean_grid_cell,
            (Some(grain), FluidLayer::Atmosphere) => grain.atmosphere_grid_cell,
            (None, _) => continue,
        };
        let Some((ci, cj)) = cell else {
            continue;
        };
        for (ni, nj) in grid.neighborhood(ci, cj) {
            for &j in &grid.cell_lists[grid.cell_index(ni, nj)] {
                check_and_add_contact(store, i, j)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn two_grain_store(separation: f64) -> GrainStore {
        let mut store = GrainStore::new();
        store.push(Grain::cylindrical(DVec2::new(0.0, 0.0), 10.0, 1.0));
        store.push(Grain::cylindrical(DVec2::new(separation, 0.0), 10.0, 1.0));
        store
    }

    #[test]
    fn overlapping_pair_is_registered_once() {
        let mut store = two_grain_store(18.0);
        find_contacts_all_pairs(&mut store).unwrap();
        find_contacts_all_pairs(&mut store).unwrap();
        assert_eq!(store.get(0).unwrap().contact_count(), 1);
        assert_eq!(store.get(0).unwrap().find_contact_slot(1), Some(0));
        // The higher-indexed grain does not mirror the record.
        assert_eq!(store.get(1).unwrap().contact_count(), 0);
    }

    #[test]
    fn separated_pair_is_not_registered() {
        let mut store = two_grain_store(25.0);
        find_contacts_all_pairs(&mut store).unwrap();
        assert_eq!(store.get(0).unwrap().contact_count(), 0);
    }

    #[test]
    fn disabled_grains_are_ignored() {
        let mut store = two_grain_store(18.0);
        store.get_mut(1).unwrap().enabled = false;
        find_contacts_all_pairs(&mut store).unwrap();
        assert_eq!(store.get(0).unwrap().contact_count(), 0);
    }

    #[test]
    fn stale_slot_is_reset_with_its_spring() {
        let mut store = two_grain_store(18.0);
        find_contacts_all_pairs(&mut store).unwrap();
        store.get_mut(0).unwrap().contact_displacement[0] = DVec2::new(0.5, 0.0);

        store.get_mut(1).unwrap().lin_pos.x = 50.0;
        find_contacts_all_pairs(&mut store).unwrap();

        let grain = store.get(0).unwrap();
        assert_eq!(grain.contact_count(), 0);
        assert_eq!(grain.contact_displacement[0], DVec2::ZERO);
    }

    #[test]
    fn disabling_a_grain_clears_its_established_contacts() {
        let mut store = two_grain_store(18.0);
        find_contacts_all_pairs(&mut store).unwrap();
        store.get_mut(0).unwrap().contact_displacement[0] = DVec2::new(0.2, 0.0);

        // The pair still overlaps; only the flag changed.
        store.get_mut(1).unwrap().enabled = false;
        find_contacts_all_pairs(&mut store).unwrap();

        let grain = store.get(0).unwrap();
        assert_eq!(grain.contact_count(), 0);
        assert_eq!(grain.contact_displacement[0], DVec2::ZERO);
    }

    #[test]
    fn capacity_exhaustion_is_fatal() {
        let mut store = GrainStore::new();
        let mut hub = Grain::cylindrical(DVec2::ZERO, 10.0, 1.0);
        hub.resize_contact_slots(2);
        store.push(hub);
        for k in 0..3 {
            let mut g = Grain::cylindrical(DVec2::new(1.0 + k as f64 * 0.1, 0.0), 10.0, 1.0);
            g.resize_contact_slots(2);
            store.push(g);
        }
        let err = find_contacts_all_pairs(&mut store).unwrap_err();
        assert!(matches!(
            err,
            SimError::ContactCapacityExceeded { grain: 0, nc_max: 2 }
        ));
    }
}
