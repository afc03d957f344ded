//! Domain models shared by the server and its clients

pub mod dining_table;
pub mod member;
pub mod order;
pub mod product;

pub use dining_table::{
    DiningTable, DiningTableCreate, TableStatus, TableStatusChange, TableStatusUpdate,
};
pub use member::MemberRole;
pub use order::{
    ItemQuantityUpdate, Order, OrderCancel, OrderCreate, OrderCreated, OrderDetail, OrderItem,
    OrderItemInput, OrderItemView, OrderPage, OrderQuery, OrderSource, OrderStatus,
    TableSettlement,
};
pub use product::{Product, ProductCreate, ProductProjection};
