use glam::DVec2;
use pack_ice::*;

fn floe(x: f64, y: f64, radius: f64) -> Grain {
    Grain::cylindrical(DVec2::new(x, y), radius, 1.0)
}

/// Active-contact sets of a store, as (owner, neighbor) pairs.
fn contact_pairs(grains: &GrainStore) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, grain) in grains.iter().enumerate() {
        for slot in grain.contacts.iter().flatten() {
            pairs.push((i, *slot));
        }
    }
    pairs.sort_unstable();
    pairs
}

#[test]
fn overlapping_pair_detected_by_both_strategies() {
    // Radii 10 and 10, centers 18 apart: overlap of 2.
    let mut brute = GrainStore::new();
    brute.push(floe(10.0, 10.0, 10.0));
    brute.push(floe(28.0, 10.0, 10.0));
    let mut gridded = brute.clone();

    find_contacts_all_pairs(&mut brute).expect("all-pairs search");

    let mut grid = FluidGrid::regular(4, 4, 80.0, 80.0);
    grid.sort_grains(&mut gridded, FluidLayer::Ocean);
    find_contacts_in_grid(&mut gridded, &grid, FluidLayer::Ocean).expect("grid search");

    assert_eq!(contact_pairs(&brute), vec![(0, 1)]);
    assert_eq!(contact_pairs(&brute), contact_pairs(&gridded));
}

#[test]
fn strategies_agree_on_a_packed_cluster() {
    let mut brute = GrainStore::new();
    // 5x5 lattice with slight overlap between lattice neighbors.
    for j in 0..5 {
        for i in 0..5 {
            brute.push(floe(5.0 + i as f64 * 1.9, 5.0 + j as f64 * 1.9, 1.0));
        }
    }
    let mut gridded = brute.clone();

    find_contacts_all_pairs(&mut brute).expect("all-pairs search");

    let mut grid = FluidGrid::regular(8, 8, 20.0, 20.0);
    grid.sort_grains(&mut gridded, FluidLayer::Ocean);
    find_contacts_in_grid(&mut gridded, &grid, FluidLayer::Ocean).expect("grid search");

    let pairs = contact_pairs(&brute);
    assert_eq!(pairs, contact_pairs(&gridded));
    // 2 * 5 * 4 lattice edges; diagonal neighbors do not touch.
    assert_eq!(pairs.len(), 40);
}

#[test]
fn grid_search_wraps_across_periodic_sides() {
    let mut grains = GrainStore::new();
    grains.push(floe(1.0, 20.0, 2.0));
    grains.push(floe(39.0, 20.0, 2.0));

    let mut grid = FluidGrid::regular(10, 10, 40.0, 40.0);
    grid.bc = BoundaryConditions::periodic_x();
    grid.sort_grains(&mut grains, FluidLayer::Ocean);

    // The wrapped neighborhood of the west column includes the east
    // column, but the pair is 38 apart in raw coordinates: no contact.
    find_contacts_in_grid(&mut grains, &grid, FluidLayer::Ocean).expect("grid search");
    assert!(contact_pairs(&grains).is_empty());
}

#[test]
fn separation_resets_slot_and_spring_on_next_pass() {
    let mut grains = GrainStore::new();
    grains.push(floe(0.0, 0.0, 10.0));
    grains.push(floe(18.0, 0.0, 10.0));

    find_contacts_all_pairs(&mut grains).expect("search");
    assert_eq!(grains.get(0).unwrap().contact_count(), 1);
    grains.get_mut(0).unwrap().contact_displacement[0] = DVec2::new(0.2, 0.1);

    // Separate beyond the contact-radius sum and search again.
    grains.get_mut(1).unwrap().lin_pos.x = 21.0;
    find_contacts_all_pairs(&mut grains).expect("search");

    let owner = grains.get(0).unwrap();
    assert_eq!(owner.contact_count(), 0);
    assert_eq!(owner.contacts[0], None);
    assert_eq!(owner.contact_displacement[0], DVec2::ZERO);
}

#[test]
fn lower_index_owns_the_contact_regardless_of_discovery_order() {
    let mut grains = GrainStore::new();
    grains.push(floe(18.0, 0.0, 10.0));
    grains.push(floe(0.0, 0.0, 10.0));

    // Grid search visits grain 0 first and finds grain 1 in a
    // neighboring cell; the record must still land on grain 0.
    let mut grid = FluidGrid::regular(2, 2, 40.0, 40.0);
    grid.sort_grains(&mut grains, FluidLayer::Ocean);
    find_contacts_in_grid(&mut grains, &grid, FluidLayer::Ocean).expect("grid search");

    assert_eq!(contact_pairs(&grains), vec![(0, 1)]);
}
