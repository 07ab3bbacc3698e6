// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Address, Listing, ListingWithAddress, NewAddress, NewListing};
pub use requests::{AddressFilterParams, ListingFilterParams, ListingPayload, Page, PageParams};
pub use responses::{
    AddressSummary, ErrorResponse, HealthResponse, ListingDetail, ListingSummary, Paginated,
};
