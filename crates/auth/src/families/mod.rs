//! Family resolvers of the latest topology API.
//!
//! Each module owns a slice of the route table. The order of [`latest`]
//! encodes precedence between families.

mod association_type;
mod attribute;
mod attribute_group;
mod classification;
mod instance;
mod instance_association;
mod mainline;
mod object;
mod object_association;
mod object_unique;

use crate::resolver::Family;

pub fn latest() -> Vec<Family> {
    vec![
        Family::new("object_unique", object_unique::routes),
        Family::new("association_type", association_type::routes),
        Family::new("object_association", object_association::routes),
        Family::new("instance_association", instance_association::routes),
        Family::new("instance", instance::routes),
        Family::new("object", object::routes),
        Family::new("classification", classification::routes),
        Family::new("attribute_group", attribute_group::routes),
        Family::new("attribute", attribute::routes),
        Family::new("mainline", mainline::routes),
    ]
}
