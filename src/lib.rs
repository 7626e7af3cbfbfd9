#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_property as property;

pub use vc_property::{
    copy_properties, deregister_converter, get_property, register_converter, reset_converters,
    set_property,
};
