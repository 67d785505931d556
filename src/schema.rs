// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined message-definition table (§4.7).
//!
//! Each entry is published verbatim by `ros/common_msgs`; these are fixed
//! external constants, never recomputed.

/// `(msgdef, md5sum)` for a well-known message type.
pub struct Schema {
    /// Full ROS1 message definition text.
    pub msgdef: &'static str,
    /// 32-hex-character MD5 sum of the message definition.
    pub md5sum: &'static str,
}

const INT8: Schema = Schema {
    msgdef: "int8 data",
    md5sum: "27ffa0c9c4b8fb8492252bcad9e5c57b",
};

const COMPRESSED_IMAGE: Schema = Schema {
    msgdef: "std_msgs/Header header\nstring format\nuint8[] data\n",
    md5sum: "8f7a12909da2c9d3332d540a0977563f",
};

const IMAGE: Schema = Schema {
    msgdef: "std_msgs/Header header\nuint32 height\nuint32 width\nstring encoding\nuint8 is_bigendian\nuint32 step\nuint8[] data\n",
    md5sum: "060021388200f6f0f447d0fcd9c64743",
};

const IMU: Schema = Schema {
    msgdef: "std_msgs/Header header\ngeometry_msgs/Quaternion orientation\nfloat64[9] orientation_covariance\ngeometry_msgs/Vector3 angular_velocity\nfloat64[9] angular_velocity_covariance\ngeometry_msgs/Vector3 linear_acceleration\nfloat64[9] linear_acceleration_covariance\n",
    md5sum: "6a62c6daae103f4ff57a132d6f95cec2",
};

const TABLE: &[(&str, &Schema)] = &[
    ("std_msgs/msg/Int8", &INT8),
    ("sensor_msgs/msg/CompressedImage", &COMPRESSED_IMAGE),
    ("sensor_msgs/msg/Image", &IMAGE),
    ("sensor_msgs/msg/Imu", &IMU),
];

/// Look up a predefined schema by `msgtype`, accepting both the
/// `pkg/msg/Type` form and its `pkg/Type` alias.
pub fn lookup(msgtype: &str) -> Option<&'static Schema> {
    for (canonical, schema) in TABLE {
        if *canonical == msgtype || canonical.replace("/msg/", "/") == msgtype {
            return Some(schema);
        }
    }
    None
}
