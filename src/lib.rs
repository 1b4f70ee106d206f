// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A 2D vector path kernel.
//!
//! Paths are built by sending drawing commands into a [`PathBuilder`], which
//! checks that every subpath starts with `move_to` and expands arcs and
//! smooth curves into lines, quadratic and cubic Béziers. The primitives then
//! flow into any [`PathSink`]: a [`BezPath`] recording them, a
//! [`BoundingBox`], a [`Transformed`] coordinate mapper, or one of the path
//! filters ([`offset`], [`cut`], [`markers`], [`elide`]).
//!
//! On top of the segment algebra ([`Line`], [`QuadBez`], [`CubicBez`] and
//! their sum [`PathSeg`]) the crate provides a classified pairwise
//! [intersection engine](intersect), a [curve fitter](fit) turning sampled
//! points into cubic Béziers, and the SVG path [mini-language](svg).
//!
//! # Examples
//!
//! ```
//! use vecpath::intersect::{intersect, Geometry, IntersectionStatus};
//! use vecpath::{BezPath, Circle, PathSeg};
//!
//! let path = BezPath::from_svg("M0 0C10 20 30 20 40 0").unwrap();
//! let seg: PathSeg = path.segments().next().unwrap();
//! let circle = Geometry::Circle(Circle::new((20.0, 0.0), 16.0));
//! let result = intersect(&seg.into(), &circle);
//! assert_eq!(result.status(), IntersectionStatus::Intersection);
//! assert_eq!(result.points().len(), 2);
//! assert!(result.points()[0].t1 < result.points()[1].t1);
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. The `alloc` crate is
//! used in either case.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    reason = "numeric code"
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("vecpath requires either the `std` or `libm` feature");

extern crate alloc;

mod affine;
mod arc;
mod bezpath;
mod builder;
mod circle;
pub mod common;
mod cubicbez;
pub mod cut;
pub mod elide;
mod ellipse;
pub mod fit;
pub mod intersect;
mod line;
pub mod markers;
pub mod offset;
mod param_curve;
mod point;
mod poly;
mod quadbez;
mod rect;
pub mod svg;
mod vec2;

pub use crate::affine::*;
pub use crate::arc::*;
pub use crate::bezpath::*;
pub use crate::builder::*;
pub use crate::circle::*;
pub use crate::cubicbez::*;
pub use crate::ellipse::*;
pub use crate::line::*;
pub use crate::param_curve::*;
pub use crate::point::*;
pub use crate::poly::*;
pub use crate::quadbez::*;
pub use crate::rect::*;
pub use crate::vec2::*;
