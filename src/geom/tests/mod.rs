mod test_bvh_basic;
mod test_surface_basic;
mod test_uw_basic;
