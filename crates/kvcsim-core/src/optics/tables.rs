//! Embedded optical-constant tables.
//!
//! Energies in eV. These arrays are the single copy of each curve; geometry
//! and detection code reach them by name through [`super::lookup`].

/// MPPC photon detection efficiency, energy axis.
pub const MPPC_PDE_ENERGY_EV: [f64; 502] = [
    1.3811, 1.3829, 1.3846, 1.3864, 1.3882, 1.3899, 1.3917, 1.3935,
    1.3953, 1.3971, 1.3989, 1.4007, 1.4025, 1.4043, 1.4061, 1.4079,
    1.4098, 1.4116, 1.4134, 1.4153, 1.4171, 1.4190, 1.4208, 1.4227,
    1.4245, 1.4264, 1.4283, 1.4302, 1.4321, 1.4339, 1.4358, 1.4377,
    1.4396, 1.4415, 1.4435, 1.4454, 1.4473, 1.4492, 1.4512, 1.4531,
    1.4551, 1.4570, 1.4590, 1.4609, 1.4629, 1.4649, 1.4668, 1.4688,
    1.4708, 1.4728, 1.4748, 1.4768, 1.4788, 1.4808, 1.4828, 1.4849,
    1.4869, 1.4889, 1.4910, 1.4930, 1.4951, 1.4971, 1.4992, 1.5013,
    1.5034, 1.5054, 1.5075, 1.5096, 1.5117, 1.5138, 1.5159, 1.5181,
    1.5202, 1.5223, 1.5244, 1.5266, 1.5287, 1.5309, 1.5330, 1.5352,
    1.5374, 1.5396, 1.5417, 1.5439, 1.5461, 1.5483, 1.5528, 1.5550,
    1.5572, 1.5594, 1.5617, 1.5639, 1.5662, 1.5684, 1.5707, 1.5730,
    1.5753, 1.5775, 1.5798, 1.5821, 1.5844, 1.5868, 1.5891, 1.5914,
    1.5937, 1.5961, 1.5984, 1.6008, 1.6031, 1.6055, 1.6079, 1.6103,
    1.6127, 1.6150, 1.6175, 1.6199, 1.6223, 1.6247, 1.6271, 1.6296,
    1.6320, 1.6345, 1.6369, 1.6394, 1.6419, 1.6444, 1.6469, 1.6494,
    1.6519, 1.6544, 1.6569, 1.6594, 1.6620, 1.6645, 1.6671, 1.6696,
    1.6722, 1.6748, 1.6774, 1.6800, 1.6826, 1.6852, 1.6878, 1.6904,
    1.6930, 1.6957, 1.6983, 1.7010, 1.7036, 1.7063, 1.7090, 1.7117,
    1.7144, 1.7171, 1.7198, 1.7225, 1.7253, 1.7280, 1.7308, 1.7335,
    1.7363, 1.7391, 1.7419, 1.7447, 1.7475, 1.7503, 1.7531, 1.7559,
    1.7588, 1.7616, 1.7645, 1.7674, 1.7702, 1.7760, 1.7789, 1.7818,
    1.7848, 1.7877, 1.7907, 1.7936, 1.7966, 1.7995, 1.8025, 1.8055,
    1.8085, 1.8115, 1.8146, 1.8176, 1.8207, 1.8237, 1.8268, 1.8298,
    1.8329, 1.8360, 1.8391, 1.8423, 1.8454, 1.8485, 1.8517, 1.8548,
    1.8580, 1.8612, 1.8644, 1.8676, 1.8708, 1.8740, 1.8773, 1.8805,
    1.8838, 1.8870, 1.8903, 1.8936, 1.8969, 1.9002, 1.9036, 1.9069,
    1.9102, 1.9136, 1.9170, 1.9204, 1.9238, 1.9272, 1.9306, 1.9340,
    1.9375, 1.9409, 1.9444, 1.9479, 1.9514, 1.9549, 1.9584, 1.9620,
    1.9655, 1.9691, 1.9726, 1.9762, 1.9798, 1.9834, 1.9871, 1.9907,
    1.9944, 1.9980, 2.0017, 2.0054, 2.0091, 2.0128, 2.0166, 2.0203,
    2.0241, 2.0279, 2.0316, 2.0354, 2.0393, 2.0431, 2.0469, 2.0508,
    2.0547, 2.0586, 2.0625, 2.0703, 2.0743, 2.0783, 2.0822, 2.0862,
    2.0902, 2.0943, 2.0983, 2.1024, 2.1064, 2.1105, 2.1146, 2.1188,
    2.1229, 2.1271, 2.1312, 2.1354, 2.1396, 2.1438, 2.1481, 2.1523,
    2.1566, 2.1609, 2.1652, 2.1695, 2.1739, 2.1782, 2.1826, 2.1870,
    2.1914, 2.1958, 2.2003, 2.2047, 2.2092, 2.2137, 2.2182, 2.2228,
    2.2273, 2.2319, 2.2365, 2.2411, 2.2457, 2.2504, 2.2550, 2.2597,
    2.2644, 2.2692, 2.2739, 2.2787, 2.2835, 2.2883, 2.2931, 2.2979,
    2.3028, 2.3077, 2.3126, 2.3175, 2.3225, 2.3275, 2.3325, 2.3375,
    2.3425, 2.3476, 2.3527, 2.3578, 2.3629, 2.3680, 2.3732, 2.3784,
    2.3836, 2.3889, 2.3941, 2.3994, 2.4047, 2.4100, 2.4154, 2.4208,
    2.4262, 2.4316, 2.4371, 2.4425, 2.4480, 2.4536, 2.4591, 2.4647,
    2.4703, 2.4759, 2.4872, 2.4930, 2.4987, 2.5044, 2.5102, 2.5160,
    2.5219, 2.5277, 2.5336, 2.5396, 2.5455, 2.5515, 2.5575, 2.5635,
    2.5696, 2.5757, 2.5818, 2.5879, 2.5941, 2.6003, 2.6065, 2.6128,
    2.6191, 2.6254, 2.6318, 2.6382, 2.6446, 2.6510, 2.6575, 2.6640,
    2.6706, 2.6772, 2.6838, 2.6904, 2.6971, 2.7038, 2.7105, 2.7173,
    2.7241, 2.7310, 2.7379, 2.7448, 2.7517, 2.7587, 2.7657, 2.7728,
    2.7799, 2.7870, 2.7942, 2.8014, 2.8086, 2.8159, 2.8232, 2.8305,
    2.8379, 2.8454, 2.8528, 2.8603, 2.8679, 2.8755, 2.8831, 2.8908,
    2.8985, 2.9062, 2.9140, 2.9218, 2.9297, 2.9376, 2.9456, 2.9536,
    2.9617, 2.9697, 2.9779, 2.9861, 2.9943, 3.0026, 3.0109, 3.0192,
    3.0277, 3.0361, 3.0446, 3.0532, 3.0618, 3.0704, 3.0791, 3.0879,
    3.1055, 3.1144, 3.1234, 3.1324, 3.1414, 3.1505, 3.1597, 3.1689,
    3.1782, 3.1875, 3.1968, 3.2063, 3.2158, 3.2253, 3.2349, 3.2446,
    3.2543, 3.2640, 3.2739, 3.2838, 3.2937, 3.3037, 3.3138, 3.3239,
    3.3341, 3.3444, 3.3547, 3.3651, 3.3756, 3.3861, 3.3967, 3.4073,
    3.4180, 3.4288, 3.4396, 3.4506, 3.4616, 3.4726, 3.4837, 3.4949,
    3.5062, 3.5176, 3.5290, 3.5405, 3.5521, 3.5637, 3.5754, 3.5872,
    3.5991, 3.6111, 3.6231, 3.6352, 3.6474, 3.6597, 3.6721, 3.6845,
    3.6970, 3.7097, 3.7224, 3.7351, 3.7480, 3.7610, 3.7741, 3.7872,
    3.8004, 3.8138, 3.8272, 3.8407, 3.8544, 3.8681,
];

/// MPPC photon detection efficiency, probability axis.
pub const MPPC_PDE_VALUES: [f64; 502] = [
    0.1071, 0.1071, 0.1078, 0.1078, 0.1086, 0.1086, 0.1093, 0.1100,
    0.1100, 0.1107, 0.1114, 0.1114, 0.1121, 0.1128, 0.1128, 0.1135,
    0.1135, 0.1143, 0.1150, 0.1157, 0.1157, 0.1164, 0.1171, 0.1171,
    0.1178, 0.1185, 0.1185, 0.1192, 0.1200, 0.1207, 0.1207, 0.1214,
    0.1221, 0.1221, 0.1228, 0.1235, 0.1242, 0.1242, 0.1249, 0.1257,
    0.1264, 0.1264, 0.1271, 0.1278, 0.1285, 0.1285, 0.1292, 0.1299,
    0.1306, 0.1314, 0.1314, 0.1321, 0.1328, 0.1335, 0.1342, 0.1342,
    0.1349, 0.1356, 0.1363, 0.1371, 0.1371, 0.1378, 0.1385, 0.1392,
    0.1399, 0.1399, 0.1406, 0.1413, 0.1420, 0.1428, 0.1435, 0.1435,
    0.1442, 0.1449, 0.1456, 0.1463, 0.1470, 0.1477, 0.1477, 0.1485,
    0.1492, 0.1499, 0.1506, 0.1513, 0.1520, 0.1520, 0.1534, 0.1542,
    0.1549, 0.1556, 0.1563, 0.1570, 0.1577, 0.1577, 0.1584, 0.1591,
    0.1599, 0.1606, 0.1613, 0.1620, 0.1627, 0.1634, 0.1641, 0.1648,
    0.1656, 0.1670, 0.1677, 0.1684, 0.1691, 0.1691, 0.1698, 0.1705,
    0.1713, 0.1720, 0.1727, 0.1734, 0.1741, 0.1748, 0.1748, 0.1762,
    0.1777, 0.1784, 0.1791, 0.1798, 0.1805, 0.1812, 0.1819, 0.1834,
    0.1841, 0.1848, 0.1855, 0.1862, 0.1869, 0.1884, 0.1891, 0.1898,
    0.1905, 0.1912, 0.1926, 0.1933, 0.1941, 0.1948, 0.1962, 0.1969,
    0.1976, 0.1983, 0.1990, 0.2005, 0.2012, 0.2019, 0.2026, 0.2040,
    0.2048, 0.2055, 0.2062, 0.2076, 0.2083, 0.2090, 0.2105, 0.2112,
    0.2119, 0.2126, 0.2140, 0.2147, 0.2154, 0.2169, 0.2176, 0.2183,
    0.2190, 0.2204, 0.2211, 0.2219, 0.2233, 0.2247, 0.2261, 0.2268,
    0.2276, 0.2290, 0.2297, 0.2304, 0.2318, 0.2325, 0.2333, 0.2347,
    0.2354, 0.2368, 0.2375, 0.2390, 0.2397, 0.2404, 0.2418, 0.2425,
    0.2439, 0.2454, 0.2461, 0.2475, 0.2482, 0.2496, 0.2504, 0.2518,
    0.2525, 0.2539, 0.2546, 0.2561, 0.2568, 0.2582, 0.2589, 0.2603,
    0.2610, 0.2625, 0.2639, 0.2646, 0.2667, 0.2675, 0.2689, 0.2696,
    0.2710, 0.2717, 0.2732, 0.2746, 0.2753, 0.2767, 0.2789, 0.2796,
    0.2810, 0.2824, 0.2838, 0.2853, 0.2874, 0.2888, 0.2910, 0.2931,
    0.2945, 0.2967, 0.2988, 0.3002, 0.3024, 0.3045, 0.3059, 0.3074,
    0.3088, 0.3102, 0.3116, 0.3131, 0.3145, 0.3159, 0.3173, 0.3188,
    0.3202, 0.3216, 0.3223, 0.3238, 0.3252, 0.3266, 0.3273, 0.3287,
    0.3302, 0.3316, 0.3330, 0.3352, 0.3366, 0.3380, 0.3401, 0.3416,
    0.3430, 0.3444, 0.3458, 0.3473, 0.3494, 0.3508, 0.3523, 0.3537,
    0.3551, 0.3565, 0.3580, 0.3601, 0.3615, 0.3629, 0.3644, 0.3665,
    0.3679, 0.3686, 0.3701, 0.3722, 0.3736, 0.3751, 0.3765, 0.3779,
    0.3793, 0.3808, 0.3822, 0.3836, 0.3857, 0.3872, 0.3886, 0.3900,
    0.3914, 0.3929, 0.3943, 0.3957, 0.3971, 0.3993, 0.4007, 0.4021,
    0.4036, 0.4050, 0.4064, 0.4078, 0.4100, 0.4114, 0.4128, 0.4143,
    0.4157, 0.4178, 0.4192, 0.4207, 0.4221, 0.4235, 0.4249, 0.4264,
    0.4278, 0.4292, 0.4306, 0.4321, 0.4335, 0.4349, 0.4363, 0.4378,
    0.4385, 0.4399, 0.4413, 0.4428, 0.4435, 0.4449, 0.4463, 0.4470,
    0.4485, 0.4499, 0.4506, 0.4520, 0.4527, 0.4542, 0.4556, 0.4563,
    0.4570, 0.4577, 0.4591, 0.4599, 0.4606, 0.4613, 0.4620, 0.4620,
    0.4627, 0.4634, 0.4641, 0.4641, 0.4648, 0.4656, 0.4656, 0.4663,
    0.4670, 0.4670, 0.4677, 0.4684, 0.4684, 0.4691, 0.4691, 0.4698,
    0.4698, 0.4705, 0.4705, 0.4713, 0.4713, 0.4720, 0.4720, 0.4727,
    0.4727, 0.4727, 0.4727, 0.4727, 0.4734, 0.4734, 0.4727, 0.4727,
    0.4727, 0.4727, 0.4720, 0.4720, 0.4713, 0.4705, 0.4698, 0.4691,
    0.4691, 0.4684, 0.4677, 0.4670, 0.4656, 0.4648, 0.4641, 0.4634,
    0.4627, 0.4620, 0.4613, 0.4606, 0.4599, 0.4591, 0.4584, 0.4577,
    0.4570, 0.4563, 0.4556, 0.4542, 0.4534, 0.4520, 0.4513, 0.4499,
    0.4485, 0.4477, 0.4463, 0.4449, 0.4435, 0.4413, 0.4399, 0.4385,
    0.4371, 0.4356, 0.4342, 0.4328, 0.4314, 0.4299, 0.4285, 0.4271,
    0.4242, 0.4221, 0.4207, 0.4192, 0.4171, 0.4150, 0.4121, 0.4100,
    0.4071, 0.4043, 0.4014, 0.3986, 0.3957, 0.3922, 0.3893, 0.3857,
    0.3822, 0.3786, 0.3751, 0.3715, 0.3679, 0.3651, 0.3608, 0.3572,
    0.3537, 0.3501, 0.3466, 0.3423, 0.3387, 0.3352, 0.3323, 0.3287,
    0.3252, 0.3216, 0.3181, 0.3145, 0.3109, 0.3067, 0.3031, 0.2988,
    0.2945, 0.2903, 0.2860, 0.2810, 0.2753, 0.2689, 0.2625, 0.2553,
    0.2482, 0.2404, 0.2318, 0.2233, 0.2147, 0.2069, 0.1983, 0.1898,
    0.1819, 0.1741, 0.1663, 0.1584, 0.1513, 0.1442, 0.1371, 0.1306,
    0.1242, 0.1185, 0.1150, 0.1114, 0.1086, 0.1064,
];

/// MPPC window reflectivity (flat 5%).
pub const MPPC_REFLECTIVITY_ENERGY_EV: [f64; 2] = [1.3, 7.0];
pub const MPPC_REFLECTIVITY_VALUES: [f64; 2] = [0.05, 0.05];

/// Teflon wrapper reflectivity.
pub const TEFLON_REFLECTIVITY_ENERGY_EV: [f64; 10] =
    [1.3, 1.56, 1.61, 1.74, 1.90, 2.05, 2.22, 2.34, 5.42, 7.0];
pub const TEFLON_REFLECTIVITY_VALUES: [f64; 10] =
    [0.85, 0.91, 0.93, 0.95, 0.97, 0.98, 1.0, 1.0, 1.0, 1.0];

/// Black sheet reflectivity (fully absorbing).
pub const BLACKSHEET_REFLECTIVITY_ENERGY_EV: [f64; 2] = [1.3, 7.0];
pub const BLACKSHEET_REFLECTIVITY_VALUES: [f64; 2] = [0.0, 0.0];
